use super::by::{LocatorSource, Strategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Textual selector languages a locator can be rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectorLanguage {
    Css,
    XPath,
}

impl fmt::Display for SelectorLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorLanguage::Css => f.write_str("css"),
            SelectorLanguage::XPath => f.write_str("xpath"),
        }
    }
}

/// Render a locator (or locator constant) in the requested selector language.
///
/// `None` means the strategy has no equivalent in that language; it is not an error.
pub fn translate(source: impl LocatorSource, language: SelectorLanguage) -> Option<String> {
    match language {
        SelectorLanguage::Css => css_locator_for(source),
        SelectorLanguage::XPath => xpath_locator_for(source),
    }
}

/// CSS selector that reproduces the locator, or `None` if unconvertible.
pub fn css_locator_for(source: impl LocatorSource) -> Option<String> {
    let locator = source.locator();
    let val = locator.value();

    match locator.strategy() {
        Strategy::ClassName => Some(format!(".{}", val)),
        Strategy::CssSelector => Some(val.to_string()),
        Strategy::Id => Some(format!("#{}", val)),
        Strategy::LinkText => None,
        Strategy::Name => Some(format!("[name={}]", val)),
        Strategy::PartialLinkText => None,
        Strategy::TagName => Some(val.to_string()),
        Strategy::XPath => None,
    }
}

/// XPath expression that reproduces the locator, or `None` if unconvertible.
pub fn xpath_locator_for(source: impl LocatorSource) -> Option<String> {
    let locator = source.locator();
    let val = locator.value();

    match locator.strategy() {
        Strategy::ClassName => Some(format!(
            ".//*[contains(concat(' ',@class,' '),' {} ')]",
            val
        )),
        Strategy::CssSelector => None,
        Strategy::Id => Some(format!(".//*[@id='{}']", val)),
        Strategy::LinkText => Some(format!(".//a[.='{}']", val)),
        Strategy::Name => Some(format!(".//*[@name='{}']", val)),
        Strategy::PartialLinkText => Some(format!(".//a[text()[contains(.,'{}')]]", val)),
        Strategy::TagName => Some(format!(".//{}", val)),
        Strategy::XPath => Some(val.to_string()),
    }
}
