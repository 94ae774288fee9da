mod cell;
mod grid;
mod layout;
mod reconcile;
mod roster;
mod table;

pub use cell::{classify, parse_poll_label, Cell, CellClass, COMBINED_MARKER, VOID_MARKER};
pub use grid::CellGrid;
pub use layout::YearLayout;
pub use reconcile::{classify_row, reconcile, reconcile_sheet, ResultSheet, RowClass};
pub use roster::{missing_parties, normalize_name, party_columns, Roster, RosterBook};
pub use table::{DistrictVotes, PollVotes, VoidedPolls, VoteTable};
