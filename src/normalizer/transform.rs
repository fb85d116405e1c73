use serde_json::Value;

use crate::domain::{Author, PostRecord};

use super::view::PostView;

/// Build a [`PostRecord`] from a raw post node.
///
/// Returns `None` when the node has no legacy content block (deleted,
/// withheld or placeholder results). Missing optional fields default.
pub fn transform(node: &Value) -> Option<PostRecord> {
    transform_view(PostView::new(node))
}

fn transform_view(view: PostView<'_>) -> Option<PostRecord> {
    view.legacy()?;

    let id = view.id();
    let screen_name = view.screen_name();
    let text = view.text();

    Some(PostRecord {
        created_at: view.created_at(),
        full_text: text.clone(),
        text,
        lang: view.lang(),
        favorite_count: view.counter("favorite_count"),
        reply_count: view.counter("reply_count"),
        retweet_count: view.counter("retweet_count"),
        quote_count: view.counter("quote_count"),
        bookmark_count: view.counter("bookmark_count"),
        views: view.views(),
        like_url: PostRecord::like_url(&id),
        reply_url: PostRecord::reply_url(&id),
        view_url: PostRecord::view_url(&screen_name, &id),
        user: Author {
            name: view.author_name(),
            screen_name,
            profile_image_url_https: view.avatar_url(),
        },
        urls: view.links(),
        media: view.media(),
        hashtags: view.hashtags(),
        mentions: view.mentions(),
        quoted_tweet: view.quoted().and_then(transform_view).map(Box::new),
        id,
    })
}
