//! Basic usage example for the imgutil library

use imgutil::{init, ImageProcessor, ResizeMode, ResizeRequest};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init()?;

    // Raw options, validated the same way as untrusted input
    let outcome = imgutil::resize_image(&json!({
        "source": "input.png",
        "destination": "thumbs",
        "width": 320,
        "height": 240,
        "resizeMode": "cover",
        "overwrite": true
    }))
    .await?;

    println!("Wrote {}", outcome.path.display());
    if let Some(info) = &outcome.information {
        println!("  {}x{}, {} bytes, md5 {}", info.width, info.height, info.file_size, info.md5);
    }

    // Typed requests skip the JSON layer
    let processor = ImageProcessor::new();
    let outcome = processor
        .resize(
            ResizeRequest::new("input.png", "preview/input_small.jpg", 640, 480)
                .resize_mode(ResizeMode::Contain)
                .overwrite(true)
                .information(false),
        )
        .await?;
    println!("Wrote {}", outcome.path.display());

    let info = imgutil::get_image_information("input.png").await?;
    println!("Source: {}x{} ({} bytes)", info.width, info.height, info.file_size);

    Ok(())
}
