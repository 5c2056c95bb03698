#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use petportrait::caption::stub::StubGenerator;
use petportrait::vision::stub::StubAnnotator;
use petportrait::{
    CaptionConfig, CaptionPipeline, CaptionSynthesizer, PreprocessConfig, RawAnnotation,
    VisionAnalyzer,
};

/// Encodes a synthetic photo of the given size in `format`.
pub fn photo_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 5 % 256) as u8, (y * 3 % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut out, format).unwrap();
    out.into_inner()
}

pub fn photo_base64(width: u32, height: u32) -> String {
    STANDARD.encode(photo_bytes(width, height, ImageFormat::Png))
}

pub fn photo_data_url(width: u32, height: u32) -> String {
    format!("data:image/png;base64,{}", photo_base64(width, height))
}

pub fn dog_annotator() -> Arc<StubAnnotator> {
    Arc::new(StubAnnotator::new(
        vec![
            RawAnnotation::new("Dog", 0.97),
            RawAnnotation::new("Golden retriever", 0.91),
        ],
        vec![RawAnnotation::new("Dog park", 0.55)],
    ))
}

pub fn stub_pipeline(
    annotator: Arc<StubAnnotator>,
    generator: Arc<StubGenerator>,
) -> CaptionPipeline {
    CaptionPipeline::new(
        PreprocessConfig::default(),
        VisionAnalyzer::new(annotator),
        CaptionSynthesizer::new(generator, &CaptionConfig::default()),
    )
}
