mod component;
mod detail;
mod render;
mod state;
mod viewport;

pub use component::{FamilyTreeCanvas, today};
pub use detail::MemberDetail;
