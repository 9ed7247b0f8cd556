//! Logo generation prompt synthesis.

use crate::session::{Attribute, BrandDetails};

/// The text prompt handed to the image pipeline.
///
/// A non-empty custom prompt wins verbatim. Otherwise the prompt is built
/// from theme, brand name, industry and color scheme; descriptive fields are
/// lower-cased, the brand name is kept as typed.
pub fn logo_prompt(details: &BrandDetails) -> String {
    if let Some(custom) = details.custom_prompt.as_deref()
        && !custom.is_empty()
    {
        return custom.to_string();
    }

    let theme = details.value(Attribute::Theme).to_lowercase();
    let brand_name = details.value(Attribute::BrandName);
    let industry = details.value(Attribute::Industry).to_lowercase();
    let colors = details.value(Attribute::ColorScheme).to_lowercase();
    format!(
        "a {theme} style logo design for {brand_name}, a {industry} brand, using {colors} color scheme"
    )
}
