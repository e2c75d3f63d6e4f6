//! models::license

use crate::core::convert::Converter;
use crate::core::field::Field;
use crate::core::registry::{KeySource, ModelBuilder, ModelSpec};
use crate::core::types::ModelKind;

pub fn spec() -> ModelSpec {
    ModelBuilder::new(ModelKind::License)
        .doc("A license for content or code")
        .key("license_slug", KeySource::Construct)
        .field(Field::new("title", Converter::Str))
        .field(Field::new("url", Converter::Url))
        .build()
}
