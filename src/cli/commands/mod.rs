pub mod client;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_PATH: &str = "path";
pub const ARG_ID: &str = "id";
pub const ARG_POST_ID: &str = "post-id";
pub const ARG_USER_ID: &str = "user-id";
pub const ARG_CONTENT: &str = "content";

fn credentials(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_EMAIL)
                .short('e')
                .long(ARG_EMAIL)
                .help("Account email")
                .env("TWITTER_CLIENT_EMAIL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .short('p')
                .long(ARG_PASSWORD)
                .help("Account password")
                .env("TWITTER_CLIENT_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}

fn id_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .required(true)
        .value_parser(clap::value_parser!(i64))
}

fn content_arg() -> Arg {
    Arg::new(ARG_CONTENT).help("Text content").required(true)
}

fn posts() -> Command {
    Command::new("posts")
        .about("Create, read, update and delete posts")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("List all posts"))
        .subcommand(
            Command::new("get")
                .about("Show one post")
                .arg(id_arg(ARG_ID, "Post id")),
        )
        .subcommand(
            Command::new("by-user")
                .about("List the posts of a user")
                .arg(id_arg(ARG_USER_ID, "User id")),
        )
        .subcommand(
            Command::new("create")
                .about("Create a post")
                .arg(content_arg()),
        )
        .subcommand(
            Command::new("update")
                .about("Replace the content of a post")
                .arg(id_arg(ARG_ID, "Post id"))
                .arg(content_arg()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a post")
                .arg(id_arg(ARG_ID, "Post id")),
        )
}

fn comments() -> Command {
    Command::new("comments")
        .about("Manage the comments of a post")
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about("List the comments of a post")
                .arg(id_arg(ARG_POST_ID, "Post id")),
        )
        .subcommand(
            Command::new("create")
                .about("Comment on a post")
                .arg(id_arg(ARG_POST_ID, "Post id"))
                .arg(content_arg()),
        )
        .subcommand(
            Command::new("update")
                .about("Replace the content of a comment")
                .arg(id_arg(ARG_ID, "Comment id"))
                .arg(content_arg()),
        )
        .subcommand(
            Command::new("delete")
                .about("Soft delete a comment")
                .arg(id_arg(ARG_ID, "Comment id")),
        )
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("twitter-client")
        .about("Session-aware client for the twitter-api")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(credentials(
            Command::new("login").about("Log in and store the session"),
        ))
        .subcommand(credentials(
            Command::new("register").about("Create an account"),
        ))
        .subcommand(Command::new("logout").about("Forget the stored session"))
        .subcommand(Command::new("refresh").about("Trade the refresh token for a new access token"))
        .subcommand(Command::new("profile").about("Fetch and store the current user profile"))
        .subcommand(Command::new("status").about("Show the stored session state"))
        .subcommand(
            Command::new("navigate")
                .about("Check whether a page may be opened with the current session")
                .arg(Arg::new(ARG_PATH).help("Page path, example: /profile").required(true)),
        )
        .subcommand(posts())
        .subcommand(comments())
        .subcommand(
            Command::new("admin")
                .about("Administration")
                .subcommand_required(true)
                .subcommand(Command::new("users").about("List all users")),
        );

    let command = client::with_args(command);
    logging::with_args(command)
}
