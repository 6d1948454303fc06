use std::path::Path;

mod scan;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <ticket_image> [recognized_text_file]", args[0]);
        eprintln!("\nExample:");
        eprintln!("  {} ticket.jpg", args[0]);
        eprintln!("  {} ticket.jpg easyocr_output.txt", args[0]);
        std::process::exit(1);
    }

    let image_path = &args[1];
    if !Path::new(image_path).exists() {
        eprintln!("Image not found: {}", image_path);
        std::process::exit(1);
    }

    // Try different possible paths for the template directory
    let possible_template_dirs = [
        "templates",
        "./templates",
        "../templates",
        "assets/templates",
    ];

    let mut templates_dir = None;
    for dir in &possible_template_dirs {
        if Path::new(dir).is_dir() {
            templates_dir = Some(*dir);
            break;
        }
    }

    let templates_dir = match templates_dir {
        Some(dir) => {
            println!("Found template directory at: {}", dir);
            dir
        }
        None => {
            eprintln!("Template directory not found. Tried paths:");
            for dir in &possible_template_dirs {
                eprintln!("  - {}", dir);
            }
            eprintln!("Template matching will be disabled without digit templates.");
            "templates"
        }
    };

    let recognized_text = args.get(2).map(|path| {
        std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("Failed to read recognized text from '{}': {}", path, e);
            std::process::exit(1);
        })
    });

    match scan::scan_ticket(image_path, recognized_text.as_deref(), templates_dir) {
        Ok(plays) => {
            if plays.is_empty() {
                println!("No valid plays extracted");
            }
        }
        Err(e) => {
            eprintln!("Extraction failed: {}", e);
            std::process::exit(1);
        }
    }
}
