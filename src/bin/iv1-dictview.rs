//! `iv1-dictview image_input.iv1 image_output.png`: renders both trained
//! dictionaries as a single `1024x1024` grid image, for inspecting what a
//! codebook learned independent of any particular encoded image.

use std::io::Write;
use std::path::Path;

use iv1::container::Iv1File;

fn main() {
    let log_file: Box<dyn Write + Send> =
        Box::new(std::fs::File::create("iv1-dictview.log").expect("open log file"));
    simplelog::WriteLogger::init(iv1::LOG_LEVEL, simplelog::Config::default(), log_file)
        .expect("init logger");

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        println!("Usage: iv1-dictview image_input.iv1 image_output.png");
        std::process::exit(0);
    }

    let input_path = Path::new(&args[1]);
    let output_path = Path::new(&args[2]);

    let file = match Iv1File::load(input_path) {
        Ok(f) => f,
        Err(iv1::Error::Io(_)) => {
            eprintln!("cannot read {}", input_path.display());
            log::error!("cannot read {}", input_path.display());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            log::error!("failed to read {}: {}", input_path.display(), e);
            std::process::exit(1);
        }
    };

    match iv1::pipeline::dictview(&file) {
        Ok(view) => {
            log::info!("writing {}", output_path.display());
            if let Err(e) = view.save(output_path) {
                log::error!("failed to write {}: {}", output_path.display(), e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            log::error!("dictview failed: {}", e);
            std::process::exit(1);
        }
    }
}
