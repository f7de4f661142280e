//! Domain → response conversions.

use blogicum_core::domain::{Category, CommentSummary, PostSummary, User};
use blogicum_core::ports::Page;
use blogicum_shared::PageResponse;
use blogicum_shared::dto::{
    CategoryResponse, CommentResponse, LocationResponse, PostResponse, ProfileResponse,
    UserResponse,
};

pub fn category(category: &Category) -> CategoryResponse {
    CategoryResponse {
        title: category.title.clone(),
        description: category.description.clone(),
        slug: category.slug.clone(),
    }
}

pub fn post(summary: PostSummary) -> PostResponse {
    let PostSummary {
        post,
        author_username,
        category: post_category,
        location,
        comment_count,
    } = summary;

    PostResponse {
        id: post.id,
        title: post.title,
        text: post.text,
        image: post.image,
        pub_date: post.pub_date,
        author: author_username,
        category: post_category.as_ref().map(category),
        location: location
            .filter(|l| l.is_published)
            .map(|l| LocationResponse { name: l.name }),
        is_published: post.is_published,
        created_at: post.created_at,
        comment_count,
    }
}

pub fn posts(page: Page<PostSummary>) -> PageResponse<PostResponse> {
    let (has_next, has_previous) = (page.has_next(), page.has_previous());
    let page = page.map(post);

    PageResponse {
        items: page.items,
        page: page.number,
        page_size: page.size,
        total_items: page.total_items,
        total_pages: page.total_pages,
        has_next,
        has_previous,
    }
}

pub fn comment(summary: CommentSummary) -> CommentResponse {
    CommentResponse {
        id: summary.comment.id,
        post_id: summary.comment.post_id,
        text: summary.comment.text,
        author: summary.author_username,
        created_at: summary.comment.created_at,
    }
}

pub fn profile(user: &User) -> ProfileResponse {
    ProfileResponse {
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        date_joined: user.created_at,
    }
}

pub fn user(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        created_at: user.created_at,
    }
}
