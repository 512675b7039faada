use super::{open, print_json, require};
use crate::{api::types::CommentInput, config::ClientConfig};
use anyhow::Result;

#[derive(Debug)]
pub enum Command {
    List { post_id: i64 },
    Create { post_id: i64, content: String },
    Update { id: i64, content: String },
    Delete { id: i64 },
}

#[derive(Debug)]
pub struct Args {
    pub config: ClientConfig,
    pub command: Command,
}

/// Execute a comments action.
/// # Errors
/// Returns an error if the session cannot be opened or the request fails.
pub async fn execute(args: Args) -> Result<()> {
    let app = open(args.config)?;
    let comments = app.comments();

    let message = match args.command {
        Command::List { post_id } => {
            let listed = comments.get_comments_by_post_id(post_id).await;
            return print_json(&require(listed, "get comments")?);
        }
        Command::Create { post_id, content } => {
            let created = comments.create_comment(post_id, &CommentInput { content }).await;
            require(created, "create comment")?
        }
        Command::Update { id, content } => {
            let updated = comments.update_comment(id, &CommentInput { content }).await;
            require(updated, "update comment")?
        }
        Command::Delete { id } => require(comments.soft_delete_comment(id).await, "delete comment")?,
    };

    print_json(&message.message)
}
