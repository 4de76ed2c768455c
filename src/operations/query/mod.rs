mod is_valid;
mod islands;
mod selection_border;

pub use is_valid::IsValid;
pub use islands::Islands;
pub use selection_border::SelectionBorder;
