//! `iv1-encode image_input.png output_base`: trains both codebooks on the
//! input image and writes both the compressed container
//! (`output_base.iv1`) and a decoded PNG reconstruction (`output_base`),
//! matching the original tool's on-disk layout. Missing arguments print a
//! usage line and exit cleanly, rather than the original C++ tool's
//! behavior of reading past the end of `argv`.

use std::io::Write;
use std::path::Path;

use iv1::rgb8_image::Rgb8Image;

fn main() {
    let log_file: Box<dyn Write + Send> =
        Box::new(std::fs::File::create("iv1-encode.log").expect("open log file"));
    simplelog::WriteLogger::init(iv1::LOG_LEVEL, simplelog::Config::default(), log_file)
        .expect("init logger");

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        println!("Usage: iv1-encode image_input.png output_base");
        std::process::exit(0);
    }

    let input_path = Path::new(&args[1]);
    let output_path = Path::new(&args[2]);

    log::info!("reading image {}", input_path.display());
    let image = Rgb8Image::load(input_path);
    if image.is_empty() {
        eprintln!("cannot read {}", input_path.display());
        log::warn!(
            "failed to load {}, or image has zero size; nothing to encode",
            input_path.display()
        );
        std::process::exit(1);
    }

    let file = match iv1::pipeline::encode(&image, iv1::DEFAULT_SEED) {
        Ok(Some(f)) => f,
        Ok(None) => {
            log::warn!("image has zero blocks; nothing to encode");
            return;
        }
        Err(e) => {
            log::error!("encode failed: {}", e);
            std::process::exit(1);
        }
    };

    let iv1_path = format!("{}.iv1", output_path.display());
    log::info!("saving compressed output as {}", iv1_path);
    if let Err(e) = file.save(Path::new(&iv1_path)) {
        log::error!("failed to write {}: {}", iv1_path, e);
        std::process::exit(1);
    }

    match iv1::pipeline::decode(&file) {
        Ok(decoded) => {
            log::info!("writing {}", output_path.display());
            if let Err(e) = decoded.save(output_path) {
                log::error!("failed to write {}: {}", output_path.display(), e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            log::error!("decode failed: {}", e);
            std::process::exit(1);
        }
    }
}
