// Core of the property assistant: catalog, property filter, login gate,
// configuration and the message types shared by the chat client and the TUI.

pub mod catalog;
pub mod config;
pub mod filter;
pub mod format;
pub mod login;
pub mod protocol;

pub use catalog::{Catalog, PropertyRecord};
pub use filter::{filter, PriceBracket, SearchCriteria, WILDCARD};
