mod diary_post_repository;

pub use diary_post_repository::SqliteDiaryPostRepository;
