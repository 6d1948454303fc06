//! Ticket scan driver using playscan-cv

use playscan_core::PlayList;
use playscan_cv::{
    detection::{ExtractionConfig, PlayExtractor},
    utils::ImageUtils,
    Result, TemplateLoader,
};

/// Run the full extraction on one ticket image and print a play summary.
/// `recognized_text` feeds the textual fallback when the image path comes
/// up empty.
pub fn scan_ticket(
    image_path: &str,
    recognized_text: Option<&str>,
    templates_dir: &str,
) -> Result<PlayList> {
    let templates = TemplateLoader::new(templates_dir).load()?;
    let extractor = PlayExtractor::new(templates, ExtractionConfig::default());

    let frame = ImageUtils::load_color(image_path)?;
    let extraction = extractor.extract_with_fallback(&frame, recognized_text)?;

    println!("Extraction completed:");
    println!("  - Method: {:?}", extraction.method);
    println!("  - Markers: {}", extraction.stats.markers_found);
    println!("  - Digits matched: {}", extraction.stats.digits_matched);
    println!("  - Time: {}ms", extraction.stats.processing_time_ms);
    println!();

    for (i, play) in extraction.plays.iter().enumerate() {
        println!("  Play {}: {}", i + 1, play);
    }

    extraction.export_json("extraction.json")?;
    println!("\nExtraction data saved to: extraction.json");

    Ok(extraction.plays)
}
