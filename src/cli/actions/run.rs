use super::{admin, comments, posts, session, Action};
use anyhow::Result;

pub(super) async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Session(args) => session::execute(args).await,
        Action::Posts(args) => posts::execute(args).await,
        Action::Comments(args) => comments::execute(args).await,
        Action::Admin(args) => admin::execute(args).await,
    }
}
