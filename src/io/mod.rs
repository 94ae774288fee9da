//! File-format boundaries: boundary shapefiles, results workbooks, candidate
//! rosters and projection JSON. Everything past these functions works on
//! in-memory records only.

mod json;
mod roster;
mod shp;
mod xls;

pub use json::{read_projection, write_projection};
pub use roster::read_roster;
pub use shp::{read_poll_locations, read_source_districts, read_target_districts};
pub use xls::{district_number, read_results_dir, read_workbook};
