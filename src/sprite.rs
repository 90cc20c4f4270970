// sprite.rs：由缩略图路径找到精灵图并解码
//
// A.jpg 对应的精灵图默认是 A-reel.jpg；找不到时直接用原图本身当精灵图。

use crate::error::ReelError;
use image::io::Reader as ImageReader;
use image::RgbaImage;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

const SPRITE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// `dir/A.jpg` + `-reel` -> `dir/A-reel.jpg`. Paths with another extension
/// come back unchanged.
pub fn sprite_path(image: &Path, suffix: &str) -> PathBuf {
    let (Some(stem), Some(ext)) = (
        image.file_stem().and_then(|s| s.to_str()),
        image.extension().and_then(|s| s.to_str()),
    ) else {
        return image.to_path_buf();
    };

    if !SPRITE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
        return image.to_path_buf();
    }
    image.with_file_name(format!("{}{}.{}", stem, suffix, ext))
}

pub fn resolve_sprite(image: &Path, suffix: &str) -> PathBuf {
    let candidate = sprite_path(image, suffix);
    if candidate != image && candidate.is_file() {
        log::debug!("using sprite {:?} for {:?}", candidate, image);
        candidate
    } else {
        image.to_path_buf()
    }
}

pub fn load_sprite(path: &Path) -> Result<RgbaImage, ReelError> {
    let file = File::open(path).map_err(|source| ReelError::OpenImage {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(|source| ReelError::OpenImage {
            path: path.to_path_buf(),
            source,
        })?;
    reader.no_limits();
    Ok(reader.decode()?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_path() {
        assert_eq!(
            sprite_path(Path::new("shots/car.jpg"), "-reel"),
            PathBuf::from("shots/car-reel.jpg")
        );
        assert_eq!(
            sprite_path(Path::new("car.PNG"), "-sheet"),
            PathBuf::from("car-sheet.PNG")
        );
        assert_eq!(
            sprite_path(Path::new("car.bmp"), "-reel"),
            PathBuf::from("car.bmp")
        );
        assert_eq!(sprite_path(Path::new("car"), "-reel"), PathBuf::from("car"));
    }

    #[test]
    fn test_resolve_falls_back_to_image() {
        let path = Path::new("definitely/not/here.jpg");
        assert_eq!(resolve_sprite(path, "-reel"), path.to_path_buf());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_sprite(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, ReelError::OpenImage { .. }));
    }

    #[test]
    fn test_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("reel-sprite-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tiny-reel.png");
        RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        assert_eq!(resolve_sprite(&dir.join("tiny.png"), "-reel"), path);
        let img = load_sprite(&path).unwrap();
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(3, 1), &image::Rgba([10, 20, 30, 255]));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
