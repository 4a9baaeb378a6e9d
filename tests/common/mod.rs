#![allow(dead_code)]

pub mod entities;

use std::sync::Once;

use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend,
    Schema, Set,
};

use self::entities::{article, article_category, category, comment};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,sea_repository=debug".into());
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_test_writer()
            .init();
    });
}

/// Fresh in-memory sqlite database with the test schema applied.
///
/// A single pooled connection keeps every operation in the test on the same
/// in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    init_tracing();

    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.expect("connect to sqlite");

    let schema = Schema::new(DbBackend::Sqlite);
    let statements = [
        schema.create_table_from_entity(article::Entity),
        schema.create_table_from_entity(comment::Entity),
        schema.create_table_from_entity(category::Entity),
        schema.create_table_from_entity(article_category::Entity),
    ];
    for statement in &statements {
        db.execute(db.get_database_backend().build(statement))
            .await
            .expect("create table");
    }
    db
}

pub async fn create_article(
    db: &DatabaseConnection,
    title: &str,
    group: Option<&str>,
) -> article::Model {
    article::ActiveModel {
        title: Set(title.to_owned()),
        group: Set(group.map(str::to_owned)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert article")
}

pub async fn create_comment(
    db: &DatabaseConnection,
    article_id: i32,
    content: &str,
) -> comment::Model {
    comment::ActiveModel {
        content: Set(content.to_owned()),
        article_id: Set(article_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert comment")
}

pub async fn create_category(db: &DatabaseConnection, name: &str) -> category::Model {
    category::ActiveModel {
        id: Set(uuid::Uuid::new_v4()),
        name: Set(name.to_owned()),
    }
    .insert(db)
    .await
    .expect("insert category")
}

pub async fn attach_category(
    db: &DatabaseConnection,
    article_id: i32,
    category_id: uuid::Uuid,
) -> article_category::Model {
    article_category::ActiveModel {
        article_id: Set(article_id),
        category_id: Set(category_id),
    }
    .insert(db)
    .await
    .expect("insert article/category link")
}
