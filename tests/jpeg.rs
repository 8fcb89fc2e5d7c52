mod common;

use common::*;
use enough::Unstoppable;
use rgb::Rgba;
use zenraster::jpeg::quality::{STANDARD_CHROMINANCE, STANDARD_LUMINANCE};
use zenraster::jpeg::DEFAULT_QUALITY;
use zenraster::*;

fn jpeg_meta(data: &[u8]) -> JpegMetadata {
    match identify(data).unwrap().metadata {
        FormatMetadata::Jpeg(m) => m,
        other => panic!("expected JPEG metadata, got {other:?}"),
    }
}

fn ycbcr(luma: [u16; 64], chroma: [u16; 64], sampling: u8) -> Vec<u8> {
    JpegBuilder::new(320, 240)
        .table(0, luma)
        .table(1, chroma)
        .component(1, sampling, 0)
        .component(2, 0x11, 1)
        .component(3, 0x11, 1)
        .build()
}

#[test]
fn standard_tables_at_several_qualities() {
    for q in [25, 50, 75, 92] {
        let data = ycbcr(
            scaled(STANDARD_LUMINANCE.values(), q),
            scaled(STANDARD_CHROMINANCE.values(), q),
            0x22,
        );
        let meta = jpeg_meta(&data);
        assert_eq!(meta.luminance_quality, Some(q as u8), "q={q}");
        assert_eq!(meta.chrominance_quality, Some(q as u8), "q={q}");
        assert!(meta.uses_standard_luminance_table());
        assert!(meta.uses_standard_chrominance_table());
        assert_eq!(meta.quality(), q as u8);
    }
}

#[test]
fn reference_table_is_quality_50() {
    let data = ycbcr(STD_LUMA, *STANDARD_CHROMINANCE.values(), 0x11);
    let meta = jpeg_meta(&data);
    assert_eq!(meta.luminance_quality, Some(50));
    assert_eq!(meta.color_type, Some(JpegColorType::YCbCrRatio444));
}

#[test]
fn custom_tables_are_retained() {
    let mut luma = [2u16; 64];
    luma[0] = 1;
    let chroma = [40u16; 64];
    let data = ycbcr(luma, chroma, 0x21);
    let meta = jpeg_meta(&data);
    assert!(!meta.uses_standard_luminance_table());
    assert!(!meta.uses_standard_chrominance_table());
    assert_eq!(meta.luminance_quantization_table, Some(QuantTable::new(luma)));
    assert_eq!(meta.chrominance_quantization_table, Some(QuantTable::new(chroma)));
    assert_eq!(meta.color_type, Some(JpegColorType::YCbCrRatio422));
}

#[test]
fn sixteen_bit_table_precision() {
    let mut luma = [300u16; 64];
    luma[63] = 1000;
    let data = JpegBuilder::new(8, 8).table(0, luma).component(1, 0x11, 0).build();
    let meta = jpeg_meta(&data);
    assert_eq!(meta.luminance_quantization_table.unwrap().values(), &luma);
    assert_eq!(meta.luminance_quality, Some(5));
}

#[test]
fn missing_tables_fall_back_to_default_quality() {
    let data = JpegBuilder::new(8, 8).component(1, 0x11, 0).build();
    let meta = jpeg_meta(&data);
    assert_eq!(meta.luminance_quality, None);
    assert_eq!(meta.chrominance_quality, None);
    assert_eq!(meta.quality(), DEFAULT_QUALITY);
    assert_eq!(meta.color_type, Some(JpegColorType::Luminance));
}

#[test]
fn legacy_quality_averages_channels() {
    let mut meta = JpegMetadata::new();
    meta.luminance_quality = Some(80);
    assert_eq!(meta.quality(), 80);
    meta.chrominance_quality = Some(90);
    assert_eq!(meta.quality(), 85);
}

#[test]
fn metadata_clone_is_independent() {
    let data = ycbcr([3; 64], [5; 64], 0x22);
    let original = jpeg_meta(&data);
    let mut copy = original.clone();
    copy.luminance_quantization_table = None;
    copy.set_quality(12);
    assert_eq!(original, jpeg_meta(&data));
    assert_ne!(original, copy);
}

#[test]
fn cmyk_and_ycck() {
    let four = |b: JpegBuilder| {
        b.component(1, 0x11, 0)
            .component(2, 0x11, 0)
            .component(3, 0x11, 0)
            .component(4, 0x11, 0)
            .build()
    };
    let cmyk = four(JpegBuilder::new(4, 4).adobe(0));
    assert_eq!(jpeg_meta(&cmyk).color_type, Some(JpegColorType::Cmyk));
    let ycck = four(JpegBuilder::new(4, 4).adobe(2));
    assert_eq!(jpeg_meta(&ycck).color_type, Some(JpegColorType::Ycck));
}

#[test]
fn info_fields() {
    let data = ycbcr(STD_LUMA, *STANDARD_CHROMINANCE.values(), 0x22);
    let info = DecodeRequest::new(&data).identify().unwrap();
    assert_eq!(info.format, ImageFormat::Jpeg);
    assert_eq!((info.width, info.height), (320, 240));
    assert_eq!(info.frame_count, 1);
    assert_eq!(info.pixel_hint, PixelLayout::Rgb8);
}

#[test]
fn decode_reports_unsupported_after_header_checks() {
    let data = ycbcr(STD_LUMA, *STANDARD_CHROMINANCE.values(), 0x22);
    let err = decode(&data, Unstoppable).unwrap_err();
    assert!(err.is_unsupported(), "{err:?}");

    let limits = Limits {
        max_width: Some(100),
        ..Limits::default()
    };
    let err = DecodeRequest::new(&data)
        .with_limits(&limits)
        .decode::<Rgba<u8>>(Unstoppable)
        .unwrap_err();
    assert!(matches!(err, RasterError::LimitExceeded(_)));

    let mut truncated = data.clone();
    truncated.truncate(40);
    assert!(decode(&truncated, Unstoppable).unwrap_err().is_corrupt());
}
