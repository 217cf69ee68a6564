pub mod by;
pub mod translate;

pub use by::{Locator, LocatorSource, Strategy};
pub use translate::{css_locator_for, translate, xpath_locator_for, SelectorLanguage};
