pub mod characters;
pub mod chat;
pub mod sidebar;

pub use characters::CharacterPicker;
pub use chat::{ChatPage, ChatView};
pub use sidebar::ChatSidebar;
