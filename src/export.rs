use crate::badge;
use crate::convert::{self, IcnsConverter};
use crate::font::LabelFont;
use anyhow::{bail, Context, Result};
use image::{
    codecs::{
        ico::{IcoEncoder, IcoFrame},
        png::{CompressionType, FilterType as PngFilterType, PngEncoder},
    },
    ColorType, ImageEncoder,
};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

pub const PNG_SIZE: u32 = 512;
pub const ICO_SIZES: [u32; 6] = [256, 128, 64, 48, 32, 16];
pub const ICNS_SIZE: u32 = 1024;

/// Which of the three artifacts a run produces.
#[derive(Debug, Clone, Copy)]
pub struct Formats {
    pub png: bool,
    pub ico: bool,
    pub icns: bool,
}

impl Formats {
    pub fn from_flags(png_only: bool, ico_only: bool, icns_only: bool) -> Self {
        if png_only {
            Formats { png: true, ico: false, icns: false }
        } else if ico_only {
            Formats { png: false, ico: true, icns: false }
        } else if icns_only {
            Formats { png: false, ico: false, icns: true }
        } else {
            Formats { png: true, ico: true, icns: true }
        }
    }

    fn expected_files(&self) -> Vec<&'static str> {
        let mut files = Vec::new();
        if self.png {
            files.push("icon.png");
        }
        if self.ico {
            files.push("icon.ico");
        }
        if self.icns {
            files.push("icon.icns");
        }
        files
    }
}

pub fn generate(out_dir: &Path, formats: Formats) -> Result<()> {
    generate_with(out_dir, formats, &convert::default_chain())
}

/// Like [`generate`], with the ICNS converter chain injected so tests can
/// pin a strategy instead of probing the environment.
pub fn generate_with(
    out_dir: &Path,
    formats: Formats,
    chain: &[Box<dyn IcnsConverter>],
) -> Result<()> {
    fs::create_dir_all(out_dir).context("Can't create output directory")?;
    let font = LabelFont::load();

    println!("Creating S0LSTICE application icons...");
    println!("{}", "=".repeat(50));

    if formats.png {
        export_png(out_dir, &font)?;
    }
    if formats.ico {
        export_ico(out_dir, &font)?;
    }
    if formats.icns {
        export_icns(out_dir, &font, chain)?;
    }

    println!("{}", "=".repeat(50));
    verify(out_dir, &formats)
}

fn export_png(out_dir: &Path, font: &LabelFont) -> Result<()> {
    let path = out_dir.join("icon.png");
    println!("Creating PNG icon: {}", path.display());

    let img = badge::render_badge(PNG_SIZE, font);
    let mut out_file = BufWriter::new(
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?,
    );
    write_png(img.as_raw(), &mut out_file, PNG_SIZE)?;
    out_file.flush()?;

    println!("✓ PNG icon created: {} bytes", file_len(&path)?);
    Ok(())
}

fn export_ico(out_dir: &Path, font: &LabelFont) -> Result<()> {
    let path = out_dir.join("icon.ico");
    println!("Creating ICO icon: {}", path.display());

    let mut frames = Vec::new();
    for size in ICO_SIZES {
        // Each resolution is rendered fresh rather than downscaled.
        let img = badge::render_badge(size, font);

        // Only the 256px layer can be compressed according to the ico specs
        if size == 256 {
            let mut buf = Vec::new();
            write_png(img.as_raw(), &mut buf, size)?;
            frames.push(IcoFrame::with_encoded(buf, size, size, ColorType::Rgba8)?);
        } else {
            frames.push(IcoFrame::as_png(img.as_raw(), size, size, ColorType::Rgba8)?);
        }
    }

    let mut out_file = BufWriter::new(
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?,
    );
    IcoEncoder::new(&mut out_file).encode_images(&frames)?;
    out_file.flush()?;

    println!("✓ ICO icon created: {} bytes", file_len(&path)?);
    Ok(())
}

fn export_icns(out_dir: &Path, font: &LabelFont, chain: &[Box<dyn IcnsConverter>]) -> Result<()> {
    let path = out_dir.join("icon.icns");
    println!("Creating ICNS icon: {}", path.display());

    let img = badge::render_badge(ICNS_SIZE, font);
    let temp_path = out_dir.join("icon_temp.png");
    let mut temp_file = BufWriter::new(
        File::create(&temp_path)
            .with_context(|| format!("Failed to create {}", temp_path.display()))?,
    );
    write_png(img.as_raw(), &mut temp_file, ICNS_SIZE)?;
    temp_file.flush()?;

    let outcome = convert::run_chain(chain, &temp_path, &path)?;
    if outcome.real_icns {
        fs::remove_file(&temp_path).context("Failed to remove temporary PNG")?;
        println!("✓ ICNS icon created: {} bytes", file_len(&path)?);
    } else {
        // The temp PNG is deliberately left behind so the packaging tool
        // can pick up a true-color source later.
        println!("✓ ICNS icon created (PNG format): {} bytes", file_len(&path)?);
        println!("  Note: the packaging tool will convert this PNG to ICNS format");
    }
    Ok(())
}

// Encode image data as PNG with compression
fn write_png<W: Write>(image_data: &[u8], w: W, size: u32) -> Result<()> {
    let encoder = PngEncoder::new_with_quality(w, CompressionType::Best, PngFilterType::Adaptive);
    encoder.write_image(image_data, size, size, ColorType::Rgba8)?;
    Ok(())
}

fn file_len(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len())
}

/// Final gate: every expected artifact must exist with a non-zero size.
fn verify(out_dir: &Path, formats: &Formats) -> Result<()> {
    let mut all_ok = true;
    for name in formats.expected_files() {
        let path = out_dir.join(name);
        match fs::metadata(&path) {
            Ok(meta) if meta.len() > 0 => println!("✓ {name}: {} bytes", meta.len()),
            Ok(_) => {
                println!("✗ {name}: ERROR - file is empty!");
                all_ok = false;
            }
            Err(_) => {
                println!("✗ {name}: ERROR - file is missing!");
                all_ok = false;
            }
        }
    }

    if !all_ok {
        bail!("one or more icon files are missing or empty");
    }
    println!("All icons created successfully!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::PngPlaceholder;
    use tempfile::TempDir;

    #[test]
    fn format_flags_select_a_single_artifact() {
        let all = Formats::from_flags(false, false, false);
        assert_eq!(all.expected_files(), ["icon.png", "icon.ico", "icon.icns"]);

        assert_eq!(Formats::from_flags(true, false, false).expected_files(), ["icon.png"]);
        assert_eq!(Formats::from_flags(false, true, false).expected_files(), ["icon.ico"]);
        assert_eq!(Formats::from_flags(false, false, true).expected_files(), ["icon.icns"]);
    }

    #[test]
    fn placeholder_fallback_leaves_the_temp_png() {
        let tmp = TempDir::new().unwrap();
        let chain: Vec<Box<dyn IcnsConverter>> = vec![Box::new(PngPlaceholder)];

        generate_with(tmp.path(), Formats::from_flags(false, false, true), &chain).unwrap();

        let icns = tmp.path().join("icon.icns");
        assert!(icns.metadata().unwrap().len() > 0);
        assert!(tmp.path().join("icon_temp.png").exists());

        // The placeholder is PNG bytes under an .icns name.
        let decoded = image::io::Reader::open(&icns)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .decode()
            .unwrap();
        assert_eq!(decoded.width(), ICNS_SIZE);
    }

    #[test]
    fn ico_export_writes_all_six_frames() {
        let tmp = TempDir::new().unwrap();
        let font = LabelFont::Builtin;
        export_ico(tmp.path(), &font).unwrap();

        let data = fs::read(tmp.path().join("icon.ico")).unwrap();
        // ICONDIR: reserved u16, type u16, count u16 (little endian).
        let count = u16::from_le_bytes([data[4], data[5]]);
        assert_eq!(count as usize, ICO_SIZES.len());

        // Directory entries start at offset 6, 16 bytes each; a width byte
        // of 0 encodes 256.
        let mut widths: Vec<u32> = (0..count as usize)
            .map(|i| {
                let w = data[6 + i * 16] as u32;
                if w == 0 {
                    256
                } else {
                    w
                }
            })
            .collect();
        widths.sort_unstable();
        let mut expected = ICO_SIZES.to_vec();
        expected.sort_unstable();
        assert_eq!(widths, expected);
    }

    #[test]
    fn png_export_round_trips_at_512() {
        let tmp = TempDir::new().unwrap();
        export_png(tmp.path(), &LabelFont::Builtin).unwrap();

        let decoded = image::open(tmp.path().join("icon.png")).unwrap();
        assert_eq!(decoded.width(), PNG_SIZE);
        assert_eq!(decoded.height(), PNG_SIZE);
    }
}
