/// Business logic for post-service
///
/// - `posts`: the mutation API over posts, likes and comments
/// - `accounts`: registration, login and profile management
/// - `hydrate`: resolves stored user ids into display summaries
pub mod accounts;
pub mod hydrate;
pub mod posts;

pub use accounts::{AccountService, AuthResponse};
pub use hydrate::{hydrate_post, hydrate_posts};
pub use posts::PostService;
