//! PFT: Project Folder Toolkit
//!
//! Allocates sequential `YYYY.NNN` project numbers from the folders already
//! under a projects root and provisions new project folders by copying a
//! discipline template (CAD, Revit or Generic).

pub mod cli;
pub mod core;
pub mod yaml;
