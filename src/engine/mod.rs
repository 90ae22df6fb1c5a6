pub mod board;
pub mod drag;
pub mod session;
pub mod view;

pub use board::{BoardEvent, CategoryBoard, DeleteDialog, FocusTarget, Notice, NoticeLevel};
pub use drag::{DragController, DropOutcome};
pub use session::{DraftRow, EditSlot, EditingSession, PendingWrite, TempId};
pub use view::{RowItem, ViewNode, ViewRow};
