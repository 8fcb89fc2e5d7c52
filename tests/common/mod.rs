//! Hand-built TIFF and JPEG byte fixtures.
#![allow(dead_code)]

pub const IMAGE_WIDTH: u16 = 256;
pub const IMAGE_LENGTH: u16 = 257;
pub const BITS_PER_SAMPLE: u16 = 258;
pub const COMPRESSION: u16 = 259;
pub const PHOTOMETRIC: u16 = 262;
pub const STRIP_OFFSETS: u16 = 273;
pub const SAMPLES_PER_PIXEL: u16 = 277;
pub const ROWS_PER_STRIP: u16 = 278;
pub const STRIP_BYTE_COUNTS: u16 = 279;
pub const PREDICTOR: u16 = 317;
pub const COLOR_MAP: u16 = 320;
pub const EXTRA_SAMPLES: u16 = 338;

#[derive(Clone, Debug)]
pub enum Values {
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<(u32, u32)>),
}

impl Values {
    fn field_type(&self) -> u16 {
        match self {
            Values::Short(_) => 3,
            Values::Long(_) => 4,
            Values::Rational(_) => 5,
        }
    }

    fn count(&self) -> u32 {
        match self {
            Values::Short(v) => v.len() as u32,
            Values::Long(v) => v.len() as u32,
            Values::Rational(v) => v.len() as u32,
        }
    }

    fn encode(&self, w: &Writer) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Values::Short(v) => v.iter().for_each(|&x| out.extend(w.u16(x))),
            Values::Long(v) => v.iter().for_each(|&x| out.extend(w.u32(x))),
            Values::Rational(v) => v.iter().for_each(|&(n, d)| {
                out.extend(w.u32(n));
                out.extend(w.u32(d));
            }),
        }
        out
    }
}

struct Writer {
    big_endian: bool,
}

impl Writer {
    fn u16(&self, v: u16) -> [u8; 2] {
        if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    }

    fn u32(&self, v: u32) -> [u8; 4] {
        if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    }
}

/// One IFD plus its strips.
#[derive(Clone, Debug)]
pub struct Page {
    entries: Vec<(u16, Values)>,
    strips: Vec<Vec<u8>>,
    byte_counts: bool,
}

impl Page {
    /// Width, height, photometric, bits per sample (one entry per sample).
    pub fn new(width: u32, height: u32, photometric: u16, bits: &[u16]) -> Self {
        Page {
            entries: vec![
                (IMAGE_WIDTH, Values::Long(vec![width])),
                (IMAGE_LENGTH, Values::Long(vec![height])),
                (BITS_PER_SAMPLE, Values::Short(bits.to_vec())),
                (PHOTOMETRIC, Values::Short(vec![photometric])),
                (SAMPLES_PER_PIXEL, Values::Short(vec![bits.len() as u16])),
            ],
            strips: Vec::new(),
            byte_counts: true,
        }
    }

    pub fn tag(mut self, tag: u16, values: Values) -> Self {
        self.entries.retain(|(t, _)| *t != tag);
        self.entries.push((tag, values));
        self
    }

    /// Single strip holding the whole image.
    pub fn strip(self, data: Vec<u8>) -> Self {
        self.strips_of(u32::MAX, vec![data])
    }

    pub fn strips_of(mut self, rows_per_strip: u32, strips: Vec<Vec<u8>>) -> Self {
        self.strips = strips;
        self.tag(ROWS_PER_STRIP, Values::Long(vec![rows_per_strip]))
    }

    /// Omit StripByteCounts.
    pub fn without_byte_counts(mut self) -> Self {
        self.byte_counts = false;
        self
    }
}

/// Multi-page TIFF writer.
pub struct TiffBuilder {
    big_endian: bool,
    pages: Vec<Page>,
}

impl TiffBuilder {
    pub fn little_endian() -> Self {
        TiffBuilder {
            big_endian: false,
            pages: Vec::new(),
        }
    }

    pub fn big_endian() -> Self {
        TiffBuilder {
            big_endian: true,
            pages: Vec::new(),
        }
    }

    pub fn page(mut self, page: Page) -> Self {
        self.pages.push(page);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let w = Writer {
            big_endian: self.big_endian,
        };
        let mut out = if self.big_endian {
            b"MM\0*".to_vec()
        } else {
            b"II*\0".to_vec()
        };
        let mut next_ptr = out.len();
        out.extend([0; 4]);

        for page in &self.pages {
            let mut offsets = Vec::new();
            let mut counts = Vec::new();
            for strip in &page.strips {
                offsets.push(out.len() as u32);
                counts.push(strip.len() as u32);
                out.extend(strip);
            }
            if out.len() % 2 == 1 {
                out.push(0);
            }

            let mut entries = page.entries.clone();
            if !entries.iter().any(|(t, _)| *t == STRIP_OFFSETS) {
                entries.push((STRIP_OFFSETS, Values::Long(offsets)));
            }
            if page.byte_counts && !entries.iter().any(|(t, _)| *t == STRIP_BYTE_COUNTS) {
                entries.push((STRIP_BYTE_COUNTS, Values::Long(counts)));
            }
            entries.sort_by_key(|(t, _)| *t);

            let ifd_pos = out.len();
            out[next_ptr..next_ptr + 4].copy_from_slice(&w.u32(ifd_pos as u32));
            let mut extra_pos = ifd_pos + 2 + 12 * entries.len() + 4;
            let mut extra = Vec::new();

            out.extend(w.u16(entries.len() as u16));
            for (tag, values) in &entries {
                out.extend(w.u16(*tag));
                out.extend(w.u16(values.field_type()));
                out.extend(w.u32(values.count()));
                let bytes = values.encode(&w);
                if bytes.len() <= 4 {
                    let mut inline = bytes.clone();
                    inline.resize(4, 0);
                    out.extend(inline);
                } else {
                    out.extend(w.u32(extra_pos as u32));
                    extra_pos += bytes.len();
                    extra.extend(bytes);
                }
            }
            next_ptr = out.len();
            out.extend([0; 4]);
            out.extend(extra);
        }
        out
    }
}

/// Overwrite the next-IFD pointer of the last page so the chain loops back
/// to the first directory.
pub fn loop_last_ifd_to_first(data: &mut [u8]) {
    let big_endian = &data[..2] == b"MM";
    let read_u32 = |b: &[u8]| {
        let a = [b[0], b[1], b[2], b[3]];
        if big_endian {
            u32::from_be_bytes(a)
        } else {
            u32::from_le_bytes(a)
        }
    };
    let read_u16 = |b: &[u8]| {
        if big_endian {
            u16::from_be_bytes([b[0], b[1]])
        } else {
            u16::from_le_bytes([b[0], b[1]])
        }
    };
    let first = read_u32(&data[4..8]);
    let mut pos = first as usize;
    loop {
        let n = read_u16(&data[pos..]) as usize;
        let next_at = pos + 2 + 12 * n;
        let next = read_u32(&data[next_at..]);
        if next == 0 {
            let bytes = if big_endian {
                first.to_be_bytes()
            } else {
                first.to_le_bytes()
            };
            data[next_at..next_at + 4].copy_from_slice(&bytes);
            return;
        }
        pos = next as usize;
    }
}

/// Minimal JPEG header: DQT tables, optional APP14, SOF0 and an empty SOS.
pub struct JpegBuilder {
    tables: Vec<(u8, [u16; 64])>,
    components: Vec<(u8, u8, u8)>,
    adobe_transform: Option<u8>,
    width: u16,
    height: u16,
}

/// Annex K luminance table, natural order.
pub const STD_LUMA: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, 12, 12, 14, 19, 26, 58, 60, 55, 14, 13, 16, 24, 40, 57, 69,
    56, 14, 17, 22, 29, 51, 87, 80, 62, 18, 22, 37, 56, 68, 109, 103, 77, 24, 35, 55, 64, 81, 104,
    113, 92, 49, 64, 78, 87, 103, 121, 120, 101, 72, 92, 95, 98, 112, 100, 103, 99,
];

pub const ZIGZAG: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27,
    20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58,
    59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

impl JpegBuilder {
    pub fn new(width: u16, height: u16) -> Self {
        JpegBuilder {
            tables: Vec::new(),
            components: Vec::new(),
            adobe_transform: None,
            width,
            height,
        }
    }

    /// Table `id` given in natural order.
    pub fn table(mut self, id: u8, natural: [u16; 64]) -> Self {
        self.tables.push((id, natural));
        self
    }

    /// Component `(id, sampling byte, table id)`.
    pub fn component(mut self, id: u8, sampling: u8, table: u8) -> Self {
        self.components.push((id, sampling, table));
        self
    }

    pub fn adobe(mut self, transform: u8) -> Self {
        self.adobe_transform = Some(transform);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        fn segment(out: &mut Vec<u8>, marker: u8, payload: &[u8]) {
            out.extend([0xFF, marker]);
            out.extend(((payload.len() + 2) as u16).to_be_bytes());
            out.extend(payload);
        }
        let mut out = vec![0xFF, 0xD8];
        if let Some(t) = self.adobe_transform {
            let mut p = b"Adobe".to_vec();
            p.extend([0, 100, 0, 0, 0, 0, t]);
            segment(&mut out, 0xEE, &p);
        }
        for (id, natural) in &self.tables {
            let wide = natural.iter().any(|&v| v > 255);
            let mut p = vec![if wide { 0x10 | id } else { *id }];
            for &n in &ZIGZAG {
                if wide {
                    p.extend(natural[n].to_be_bytes());
                } else {
                    p.push(natural[n] as u8);
                }
            }
            segment(&mut out, 0xDB, &p);
        }
        let mut sof = vec![8];
        sof.extend(self.height.to_be_bytes());
        sof.extend(self.width.to_be_bytes());
        sof.push(self.components.len() as u8);
        for &(id, sampling, table) in &self.components {
            sof.extend([id, sampling, table]);
        }
        segment(&mut out, 0xC0, &sof);
        segment(&mut out, 0xDA, &[0; 6]);
        out.extend([0x00, 0xFF, 0xD9]);
        out
    }
}

/// IJG scaling of `base` to `quality`.
pub fn scaled(base: &[u16; 64], quality: u32) -> [u16; 64] {
    let scale = if quality < 50 {
        5000 / quality
    } else {
        200 - 2 * quality
    };
    let mut out = [0u16; 64];
    for (o, &b) in out.iter_mut().zip(base) {
        *o = ((u32::from(b) * scale + 50) / 100).clamp(1, 255) as u16;
    }
    out
}
