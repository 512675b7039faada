use super::{open, print_json, require};
use crate::{api::types::PostInput, config::ClientConfig};
use anyhow::Result;

#[derive(Debug)]
pub enum Command {
    List,
    Get { id: i64 },
    ByUser { user_id: i64 },
    Create { content: String },
    Update { id: i64, content: String },
    Delete { id: i64 },
}

#[derive(Debug)]
pub struct Args {
    pub config: ClientConfig,
    pub command: Command,
}

/// Execute a posts action.
/// # Errors
/// Returns an error if the session cannot be opened or the request fails.
pub async fn execute(args: Args) -> Result<()> {
    let app = open(args.config)?;
    let posts = app.posts();

    match args.command {
        Command::List => print_json(&require(posts.get_all_posts().await, "get all posts")?),
        Command::Get { id } => print_json(&require(posts.get_post_by_id(id).await, "get post")?),
        Command::ByUser { user_id } => print_json(&require(
            posts.get_posts_by_user_id(user_id).await,
            "get posts by user",
        )?),
        Command::Create { content } => {
            let created = posts.create_post(&PostInput { content }).await;
            print_json(&require(created, "create post")?.message)
        }
        Command::Update { id, content } => {
            let updated = posts.update_post(id, &PostInput { content }).await;
            print_json(&require(updated, "update post")?.message)
        }
        Command::Delete { id } => print_json(&require(posts.delete_post(id).await, "delete post")?),
    }
}
