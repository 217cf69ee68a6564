use crate::errors::BridgeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Element selection strategy understood by the remote automation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    ClassName,
    CssSelector,
    Id,
    LinkText,
    Name,
    PartialLinkText,
    TagName,
    XPath,
}

impl Strategy {
    pub const ALL: [Strategy; 8] = [
        Strategy::ClassName,
        Strategy::CssSelector,
        Strategy::Id,
        Strategy::LinkText,
        Strategy::Name,
        Strategy::PartialLinkText,
        Strategy::TagName,
        Strategy::XPath,
    ];

    /// Label used in the canonical `"<label>: <operand>"` form.
    pub fn label(self) -> &'static str {
        match self {
            Strategy::ClassName => "By.className",
            Strategy::CssSelector => "By.cssSelector",
            Strategy::Id => "By.id",
            Strategy::LinkText => "By.linkText",
            Strategy::Name => "By.name",
            Strategy::PartialLinkText => "By.partialLinkText",
            Strategy::TagName => "By.tagName",
            Strategy::XPath => "By.xpath",
        }
    }

    pub fn from_label(label: &str) -> Option<Strategy> {
        let label = label.trim();
        Strategy::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A strategy paired with its operand, e.g. `By.id: submit-btn`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    strategy: Strategy,
    operand: String,
}

impl Locator {
    pub fn new(strategy: Strategy, operand: impl Into<String>) -> Self {
        Self {
            strategy,
            operand: operand.into(),
        }
    }

    pub fn class_name(operand: impl Into<String>) -> Self {
        Self::new(Strategy::ClassName, operand)
    }

    pub fn css_selector(operand: impl Into<String>) -> Self {
        Self::new(Strategy::CssSelector, operand)
    }

    pub fn id(operand: impl Into<String>) -> Self {
        Self::new(Strategy::Id, operand)
    }

    pub fn link_text(operand: impl Into<String>) -> Self {
        Self::new(Strategy::LinkText, operand)
    }

    pub fn name(operand: impl Into<String>) -> Self {
        Self::new(Strategy::Name, operand)
    }

    pub fn partial_link_text(operand: impl Into<String>) -> Self {
        Self::new(Strategy::PartialLinkText, operand)
    }

    pub fn tag_name(operand: impl Into<String>) -> Self {
        Self::new(Strategy::TagName, operand)
    }

    pub fn xpath(operand: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, operand)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// The operand with incidental surrounding whitespace removed.
    pub fn value(&self) -> &str {
        self.operand.trim()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy.label(), self.operand)
    }
}

impl FromStr for Locator {
    type Err = BridgeError;

    /// Parses the canonical form. Everything after the first `:` is the operand.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (label, operand) = s
            .split_once(':')
            .ok_or_else(|| BridgeError::MalformedLocator(s.to_string()))?;

        let strategy = Strategy::from_label(label)
            .ok_or_else(|| BridgeError::MalformedLocator(s.to_string()))?;

        Ok(Locator::new(strategy, operand.trim()))
    }
}

/// Anything that names a locator, such as an enum of page locator constants.
pub trait LocatorSource {
    fn locator(&self) -> Locator;
}

impl LocatorSource for Locator {
    fn locator(&self) -> Locator {
        self.clone()
    }
}

impl<T: LocatorSource + ?Sized> LocatorSource for &T {
    fn locator(&self) -> Locator {
        (**self).locator()
    }
}
