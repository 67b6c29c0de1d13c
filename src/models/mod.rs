pub mod evaluation;
pub mod persona;
pub mod rubric;
pub mod slide;

pub use evaluation::{Assessment, EvaluationReport, EvaluationResult, ImageLabelSet, MeasureScore};
pub use persona::{Persona, PresentationBrief};
pub use rubric::{Grid, RubricSpec};
pub use slide::{
    ImageBlob, OtherShape, Paragraph, PictureShape, SlideRecord, SlideShape, TextBearing,
    TextRun, TextShape,
};
