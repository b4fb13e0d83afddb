pub mod create;
pub mod delete;
pub mod list;

pub use create::post as create_post;
pub use delete::delete as delete_by_id;
pub use list::get as list_by_language;
