use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{normalize_api_base_url, SETTINGS_FILE_NAME},
    fetch_listing, fetch_search, load_settings, HttpPostsClient, Listing, PageWindow, PostsApi,
};
use shared::{
    domain::{Post, PostId, SortBy, SortOrder, UserId},
    protocol::{NewPost, PostUpdate},
    search_params::{ListingKey, SearchParams, SearchParamsPatch, DEFAULT_LIMIT},
};

#[derive(Parser, Debug)]
#[command(name = "admin_cli", about = "Command-line admin for blog posts")]
struct Cli {
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print JSON instead of one line per post.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One page of posts, optionally filtered by tag and sorted.
    List {
        /// Location query string, e.g. `tag=love&skip=10`; flags below override it.
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long)]
        tag: Option<String>,
        /// id, title, reactions or none.
        #[arg(long)]
        sort_by: Option<String>,
        /// asc or desc.
        #[arg(long)]
        order: Option<String>,
        #[arg(long)]
        skip: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    Search {
        term: String,
    },
    Tags,
    /// Comments left on one post.
    Comments {
        post_id: i64,
    },
    User {
        id: i64,
    },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long, default_value_t = 1)]
        user_id: i64,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long, default_value_t = 1)]
        user_id: i64,
    },
    Delete {
        id: i64,
    },
}

fn settings_candidates(explicit: Option<PathBuf>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = explicit.into_iter().collect();
    candidates.push(PathBuf::from(SETTINGS_FILE_NAME));
    candidates
}

fn listing_params(
    query: &str,
    tag: Option<String>,
    sort_by: Option<String>,
    order: Option<String>,
    skip: Option<u32>,
    limit: Option<u32>,
    default_limit: u32,
) -> Result<SearchParams> {
    let mut params = SearchParams::parse(query);
    if params.limit.is_none() && default_limit != DEFAULT_LIMIT {
        params.limit = Some(default_limit);
    }

    let mut patch = SearchParamsPatch::default();
    if let Some(tag) = tag {
        patch = patch.with_tag(tag);
    }
    if let Some(raw) = sort_by {
        let parsed = SortBy::parse(&raw);
        if parsed.is_none() && !raw.eq_ignore_ascii_case("none") {
            bail!("unknown sort key '{raw}' (expected id, title, reactions or none)");
        }
        patch = patch.with_sort_by(parsed);
    }
    if let Some(raw) = order {
        let Some(order) = SortOrder::parse(&raw) else {
            bail!("unknown sort order '{raw}' (expected asc or desc)");
        };
        patch = patch.with_sort_order(order);
    }
    if let Some(skip) = skip {
        patch = patch.with_skip(skip);
    }
    if let Some(limit) = limit {
        patch = patch.with_limit(limit);
    }
    Ok(params.merged(&patch))
}

/// Tag listings hold every tagged post, so only untagged listings get a page footer.
fn listing_footer(key: &ListingKey, total: u64) -> String {
    match key.tag.as_deref() {
        Some(tag) => format!("{total} posts tagged \"{tag}\""),
        None => {
            let window = PageWindow::new(key.skip, key.limit, total);
            format!(
                "page {} of {} ({})",
                window.page_number(),
                window.page_count(),
                window.range_label()
            )
        }
    }
}

fn format_post_row(post: &Post) -> String {
    let author = post
        .author
        .as_ref()
        .map(|author| author.username.clone())
        .unwrap_or_else(|| format!("user {}", post.user_id));
    format!(
        "{:>5}  {}  [{}]  by {}  +{}/-{}",
        post.id.0,
        post.title,
        post.tags.join(", "),
        author,
        post.reactions.likes,
        post.reactions.dislikes
    )
}

fn print_listing(listing: &Listing, json: bool, footer: &str) -> Result<()> {
    if json {
        let value = serde_json::json!({ "posts": listing.posts, "total": listing.total });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    for post in &listing.posts {
        println!("{}", format_post_row(post));
    }
    println!("{footer}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&settings_candidates(cli.config));
    if let Some(url) = cli.api_base_url {
        settings.api_base_url = normalize_api_base_url(&url);
    }
    let client = HttpPostsClient::from_settings(&settings)
        .with_context(|| format!("invalid api base url {}", settings.api_base_url))?;

    match cli.command {
        Command::List {
            query,
            tag,
            sort_by,
            order,
            skip,
            limit,
        } => {
            let params = listing_params(
                &query,
                tag,
                sort_by,
                order,
                skip,
                limit,
                settings.default_limit,
            )?;
            let key = params.listing_key();
            let listing = fetch_listing(&client, &key).await?;
            print_listing(&listing, cli.json, &listing_footer(&key, listing.total))?;
        }
        Command::Search { term } => {
            let listing = fetch_search(&client, term.trim()).await?;
            let footer = format!("{} posts match \"{}\"", listing.total, term.trim());
            print_listing(&listing, cli.json, &footer)?;
        }
        Command::Tags => {
            let tags = client.list_tags().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&tags)?);
            } else {
                for tag in tags {
                    println!("{:<24} {}", tag.slug, tag.name);
                }
            }
        }
        Command::Comments { post_id } => {
            let comments = client.post_comments(PostId(post_id)).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&comments)?);
            } else {
                for comment in &comments {
                    println!("@{}: {} (♥ {})", comment.user.username, comment.body, comment.likes);
                }
                println!("{} comments on post {post_id}", comments.len());
            }
        }
        Command::User { id } => {
            let user = client.get_user(UserId(id)).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!("{} (@{})", user.full_name(), user.username);
                println!("email:   {}", user.email);
                println!("phone:   {}", user.phone);
                println!(
                    "address: {}, {}, {}",
                    user.address.address, user.address.city, user.address.state
                );
                println!("company: {} ({})", user.company.name, user.company.title);
            }
        }
        Command::Add {
            title,
            body,
            user_id,
        } => {
            let created = client
                .add_post(&NewPost {
                    title,
                    body,
                    user_id: UserId(user_id),
                })
                .await?;
            println!("created post_id={}", created.id);
        }
        Command::Update {
            id,
            title,
            body,
            tags,
            user_id,
        } => {
            let update = PostUpdate {
                title,
                body,
                tags,
                user_id: UserId(user_id),
            };
            let updated = client.update_post(PostId(id), &update).await?;
            println!("updated post_id={}", updated.id);
        }
        Command::Delete { id } => {
            client.delete_post(PostId(id)).await?;
            println!("deleted post_id={id}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use shared::domain::{AuthorSummary, Reactions};

    use super::*;

    #[test]
    fn flags_override_query_string() {
        let params = listing_params(
            "tag=love&skip=20&limit=10",
            Some("all".into()),
            Some("title".into()),
            Some("desc".into()),
            None,
            Some(20),
            DEFAULT_LIMIT,
        )
        .expect("params");
        let key = params.listing_key();
        assert_eq!(key.tag, None);
        assert_eq!(key.sort_by, Some(SortBy::Title));
        assert_eq!(key.sort_order, SortOrder::Desc);
        assert_eq!(key.skip, 20);
        assert_eq!(key.limit, 20);
    }

    #[test]
    fn rejects_unknown_sort_values() {
        assert!(listing_params("", None, Some("views".into()), None, None, None, 10).is_err());
        assert!(listing_params("", None, None, Some("up".into()), None, None, 10).is_err());
        let params = listing_params("sortBy=id", None, Some("none".into()), None, None, None, 10)
            .expect("none clears");
        assert_eq!(params.sort_by(), None);
    }

    #[test]
    fn configured_default_limit_applies_without_explicit_limit() {
        let params = listing_params("", None, None, None, None, None, 30).expect("params");
        assert_eq!(params.limit(), 30);
    }

    #[test]
    fn tag_listing_footer_skips_page_numbers() {
        let key = SearchParams::parse("tag=history&skip=20").listing_key();
        assert_eq!(listing_footer(&key, 5), "5 posts tagged \"history\"");
        let key = SearchParams::parse("skip=20").listing_key();
        assert!(listing_footer(&key, 25).starts_with("page 3 of 3"));
    }

    #[test]
    fn post_rows_show_author_or_user_id() {
        let mut post = Post {
            id: PostId(7),
            title: "Hello".into(),
            body: String::new(),
            tags: vec!["love".into(), "life".into()],
            user_id: UserId(3),
            reactions: Reactions {
                likes: 4,
                dislikes: 1,
            },
            views: None,
            author: None,
        };
        assert_eq!(format_post_row(&post), "    7  Hello  [love, life]  by user 3  +4/-1");
        post.author = Some(AuthorSummary {
            id: UserId(3),
            username: "emilys".into(),
            image: String::new(),
        });
        assert!(format_post_row(&post).contains("by emilys"));
    }

    #[test]
    fn parses_update_tags_as_list() {
        let cli = Cli::parse_from([
            "admin_cli",
            "update",
            "5",
            "--title",
            "t",
            "--body",
            "b",
            "--tags",
            "love,crime",
        ]);
        match cli.command {
            Command::Update { id, tags, .. } => {
                assert_eq!(id, 5);
                assert_eq!(tags, vec!["love".to_string(), "crime".to_string()]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
