//! models::run_year
//!
//! Index of course runs by calendar year.

use crate::core::convert::Converter;
use crate::core::field::Field;
use crate::core::registry::{KeySource, ModelBuilder, ModelSpec};
use crate::core::types::ModelKind;

pub fn spec() -> ModelSpec {
    ModelBuilder::new(ModelKind::RunYear)
        .doc("Collection of courses given in a specific year")
        .key("year", KeySource::Field("year"))
        .field(Field::new("year", Converter::Int))
        .field(
            Field::new("runs", Converter::list(Converter::Link(ModelKind::Course)))
                .doc("Courses running in this year, referenced by slug"),
        )
        .build()
}
