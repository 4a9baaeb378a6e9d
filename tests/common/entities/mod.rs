pub mod article;
pub mod article_category;
pub mod category;
pub mod comment;
