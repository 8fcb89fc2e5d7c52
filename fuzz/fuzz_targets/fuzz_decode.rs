#![no_main]
use libfuzzer_sys::fuzz_target;
use zenraster::{DecodeRequest, DecoderOptions, Limits};

fuzz_target!(|data: &[u8]| {
    let _ = zenraster::identify(data);

    // Keep allocations bounded so only real bugs surface.
    let limits = Limits {
        max_pixels: Some(1 << 22),
        ..Limits::default()
    };
    let options = DecoderOptions::new().with_limits(limits).with_max_frames(4);
    let request = DecodeRequest::new(data).with_options(&options);
    let _ = request.decode::<rgb::Rgba<u8>>(enough::Unstoppable);
    let _ = request.decode::<rgb::Gray<u16>>(enough::Unstoppable);
    let _ = request.decode::<rgb::Rgba<f32>>(enough::Unstoppable);
});
