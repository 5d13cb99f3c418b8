//! SQLite article and issue store
//!
//! The database sits in `.autopaper/autopaper.db`. It is the source of
//! truth for article metadata; issue markdown lives in the issues
//! directory and is mirrored here on import.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;

use crate::document::{ArticleRef, RawTags};
use crate::domain::{slug, Article, ArticleType, Issue, IssueType};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("An article with URL {0} already exists")]
    DuplicateUrl(String),

    #[error("An article with slug '{0}' already exists")]
    DuplicateSlug(String),

    #[error("Database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: i32, supported: i32 },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

const ARTICLE_COLUMNS: &str = "id, url, title, author, source, publish_date, added_date, \
     summary, tags, article_type, key_points, content, slug, cover_image";

const ISSUE_COLUMNS: &str = "id, slug, issue_type, start_date, end_date, content, created_at";

/// Article and issue database
pub struct Database {
    db_path: PathBuf,
    conn: Connection,
}

impl Database {
    /// Schema version, stored in `PRAGMA user_version`
    const SCHEMA_VERSION: i32 = 1;

    /// Creates or opens the database at `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self {
            db_path: db_path.to_path_buf(),
            conn,
        };

        db.ensure_schema()?;

        Ok(db)
    }

    /// Ensures the schema is up to date
    fn ensure_schema(&self) -> Result<()> {
        let current = self.schema_version()?;

        if current > Self::SCHEMA_VERSION {
            return Err(DatabaseError::UnsupportedSchema {
                found: current,
                supported: Self::SCHEMA_VERSION,
            }
            .into());
        }

        if current < Self::SCHEMA_VERSION {
            self.create_schema()?;
        }

        Ok(())
    }

    fn schema_version(&self) -> Result<i32> {
        let result: Option<i32> = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .optional()?;

        Ok(result.unwrap_or(0))
    }

    fn create_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT UNIQUE NOT NULL,
                title TEXT NOT NULL,
                author TEXT,
                source TEXT,
                publish_date TEXT,
                added_date TEXT NOT NULL,
                summary TEXT,
                tags TEXT,
                article_type TEXT,
                key_points TEXT,
                content TEXT,
                slug TEXT,
                cover_image TEXT
            );

            CREATE TABLE IF NOT EXISTS issues (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug TEXT UNIQUE NOT NULL,
                issue_type TEXT NOT NULL,
                start_date TEXT,
                end_date TEXT,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_articles_slug ON articles(slug);
            CREATE INDEX IF NOT EXISTS idx_articles_type ON articles(article_type);
            CREATE INDEX IF NOT EXISTS idx_issues_slug ON issues(slug);
            CREATE INDEX IF NOT EXISTS idx_issues_type ON issues(issue_type);
            ",
            )
            .context("Failed to create database schema")?;

        self.conn.execute(
            &format!("PRAGMA user_version = {}", Self::SCHEMA_VERSION),
            [],
        )?;

        Ok(())
    }

    /// Stores a new article, filling in its id and added date
    pub fn insert_article(&self, article: &mut Article) -> Result<i64> {
        if self.article_by_url(&article.url)?.is_some() {
            return Err(DatabaseError::DuplicateUrl(article.url.clone()).into());
        }
        if self.slug_exists(&article.slug)? {
            return Err(DatabaseError::DuplicateSlug(article.slug.clone()).into());
        }

        let added = *article.added_date.get_or_insert_with(Utc::now);

        self.conn
            .execute(
                "INSERT INTO articles (url, title, author, source, publish_date, added_date,
                     summary, tags, article_type, key_points, content, slug, cover_image)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    article.url,
                    article.title,
                    article.author,
                    article.source,
                    article.publish_date,
                    added.to_rfc3339(),
                    article.summary,
                    serde_json::to_string(&article.tags)?,
                    article.article_type.map(|t| t.as_str()),
                    serde_json::to_string(&article.key_points)?,
                    article.content,
                    article.slug,
                    article.cover_image,
                ],
            )
            .with_context(|| format!("Failed to insert article: {}", article.url))?;

        let id = self.conn.last_insert_rowid();
        article.id = Some(id);
        Ok(id)
    }

    /// Returns true if an article already uses `slug`
    pub fn slug_exists(&self, slug: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE slug = ?1",
            params![slug],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Derives a free slug for an article from its title and URL
    pub fn unique_article_slug(&self, title: &str, url: &str) -> Result<String> {
        let base = slug::base_slug(title, url);
        slug::unique_slug(&base, |candidate| self.slug_exists(candidate))
    }

    pub fn article_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let sql = format!("SELECT {} FROM articles WHERE slug = ?1", ARTICLE_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![slug], article_from_row)
            .optional()?)
    }

    pub fn article_by_url(&self, url: &str) -> Result<Option<Article>> {
        let sql = format!("SELECT {} FROM articles WHERE url = ?1", ARTICLE_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![url], article_from_row)
            .optional()?)
    }

    /// Lists articles, newest first
    pub fn list_articles(
        &self,
        article_type: Option<ArticleType>,
        limit: Option<usize>,
    ) -> Result<Vec<Article>> {
        let mut sql = format!("SELECT {} FROM articles WHERE 1=1", ARTICLE_COLUMNS);
        if article_type.is_some() {
            sql.push_str(" AND article_type = ?1");
        }
        sql.push_str(" ORDER BY added_date DESC, id DESC");
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = match article_type {
            Some(t) => stmt.query_map(params![t.as_str()], article_from_row)?,
            None => stmt.query_map([], article_from_row)?,
        };

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Loads the articles with the given slugs, in slug order, skipping unknown ones
    pub fn articles_by_slugs(&self, slugs: &[&str]) -> Result<Vec<Article>> {
        let mut articles = Vec::with_capacity(slugs.len());
        for slug in slugs {
            if let Some(article) = self.article_by_slug(slug)? {
                articles.push(article);
            }
        }
        Ok(articles)
    }

    /// Slug-keyed lookup fields of every article with a slug
    ///
    /// Tags are handed over as the stored JSON text; the resolver decodes them.
    pub fn article_refs(&self) -> Result<HashMap<String, ArticleRef>> {
        let mut stmt = self
            .conn
            .prepare("SELECT slug, url, cover_image, tags FROM articles WHERE slug IS NOT NULL AND slug != ''")?;

        let rows = stmt.query_map([], |row| {
            let slug: String = row.get(0)?;
            let tags: Option<String> = row.get(3)?;
            Ok((
                slug,
                ArticleRef {
                    url: row.get(1)?,
                    cover_image: row.get(2)?,
                    tags: RawTags::Encoded(tags.unwrap_or_default()),
                },
            ))
        })?;

        Ok(rows.collect::<Result<HashMap<_, _>, _>>()?)
    }

    /// Stores an issue, replacing any issue with the same slug
    pub fn save_issue(&self, issue: &mut Issue) -> Result<i64> {
        let created = *issue.created_at.get_or_insert_with(Utc::now);

        self.conn
            .execute(
                "INSERT INTO issues (slug, issue_type, start_date, end_date, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(slug) DO UPDATE SET
                     issue_type = excluded.issue_type,
                     start_date = excluded.start_date,
                     end_date = excluded.end_date,
                     content = excluded.content",
                params![
                    issue.slug,
                    issue.issue_type.as_str(),
                    issue.start_date,
                    issue.end_date,
                    issue.content,
                    created.to_rfc3339(),
                ],
            )
            .with_context(|| format!("Failed to save issue: {}", issue.slug))?;

        let id: i64 = self.conn.query_row(
            "SELECT id FROM issues WHERE slug = ?1",
            params![issue.slug],
            |row| row.get(0),
        )?;
        issue.id = Some(id);
        Ok(id)
    }

    pub fn issue_by_slug(&self, slug: &str) -> Result<Option<Issue>> {
        let sql = format!("SELECT {} FROM issues WHERE slug = ?1", ISSUE_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, params![slug], issue_from_row)
            .optional()?)
    }

    /// Lists issues, newest first
    pub fn list_issues(&self, issue_type: Option<IssueType>) -> Result<Vec<Issue>> {
        let mut sql = format!("SELECT {} FROM issues", ISSUE_COLUMNS);
        if issue_type.is_some() {
            sql.push_str(" WHERE issue_type = ?1");
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = match issue_type {
            Some(t) => stmt.query_map(params![t.as_str()], issue_from_row)?,
            None => stmt.query_map([], issue_from_row)?,
        };

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Returns the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

fn parse_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decodes a JSON list column the same lenient way issue tags are decoded
fn decode_list(value: Option<String>) -> Vec<String> {
    RawTags::Encoded(value.unwrap_or_default()).decode()
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    let article_type: Option<String> = row.get(9)?;

    Ok(Article {
        id: Some(row.get(0)?),
        url: row.get(1)?,
        title: row.get(2)?,
        author: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        source: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        publish_date: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        added_date: parse_timestamp(row.get(6)?),
        summary: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
        tags: decode_list(row.get(8)?),
        article_type: article_type.and_then(|t| t.parse().ok()),
        key_points: decode_list(row.get(10)?),
        content: row.get::<_, Option<String>>(11)?.unwrap_or_default(),
        slug: row.get::<_, Option<String>>(12)?.unwrap_or_default(),
        cover_image: row.get(13)?,
    })
}

fn issue_from_row(row: &Row<'_>) -> rusqlite::Result<Issue> {
    let issue_type: String = row.get(2)?;

    Ok(Issue {
        id: Some(row.get(0)?),
        slug: row.get(1)?,
        issue_type: issue_type.parse().unwrap_or_default(),
        start_date: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        end_date: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        content: row.get(5)?,
        created_at: parse_timestamp(row.get(6)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{parse, ArticleLookup};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join(".autopaper").join("autopaper.db")).unwrap();
        (dir, db)
    }

    fn article(slug: &str, url: &str) -> Article {
        let mut a = Article::new(url, format!("Title of {}", slug), slug);
        a.article_type = Some(ArticleType::Technical);
        a.tags = vec!["rust".to_string(), "cli".to_string()];
        a.key_points = vec!["fast".to_string()];
        a
    }

    #[test]
    fn creation_sets_schema_version() {
        let (_dir, db) = setup();
        assert!(db.path().exists());
        assert_eq!(db.schema_version().unwrap(), Database::SCHEMA_VERSION);
    }

    #[test]
    fn reopening_keeps_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("autopaper.db");
        {
            let db = Database::open(&path).unwrap();
            db.insert_article(&mut article("kept", "https://x.com/kept")).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert!(db.article_by_slug("kept").unwrap().is_some());
    }

    #[test]
    fn insert_and_read_article() {
        let (_dir, db) = setup();
        let mut a = article("my-title", "https://x.com/a");
        a.cover_image = Some("my-title.png".to_string());

        let id = db.insert_article(&mut a).unwrap();
        assert_eq!(a.id, Some(id));
        assert!(a.added_date.is_some());

        let stored = db.article_by_slug("my-title").unwrap().unwrap();
        assert_eq!(stored.title, "Title of my-title");
        assert_eq!(stored.tags, vec!["rust", "cli"]);
        assert_eq!(stored.key_points, vec!["fast"]);
        assert_eq!(stored.article_type, Some(ArticleType::Technical));
        assert_eq!(stored.cover_image.as_deref(), Some("my-title.png"));

        assert!(db.article_by_url("https://x.com/a").unwrap().is_some());
        assert!(db.article_by_slug("missing").unwrap().is_none());
    }

    #[test]
    fn duplicates_are_rejected() {
        let (_dir, db) = setup();
        db.insert_article(&mut article("a", "https://x.com/a")).unwrap();

        let err = db.insert_article(&mut article("b", "https://x.com/a")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatabaseError>(),
            Some(DatabaseError::DuplicateUrl(_))
        ));

        let err = db.insert_article(&mut article("a", "https://x.com/other")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatabaseError>(),
            Some(DatabaseError::DuplicateSlug(_))
        ));
    }

    #[test]
    fn unique_slugs_skip_taken_ones() {
        let (_dir, db) = setup();
        db.insert_article(&mut article("building-a-parser", "https://x.com/1")).unwrap();

        let slug = db
            .unique_article_slug("Building a Parser", "https://x.com/2")
            .unwrap();
        assert_eq!(slug, "building-a-parser-1");
    }

    #[test]
    fn list_filters_by_type() {
        let (_dir, db) = setup();
        db.insert_article(&mut article("tech-one", "https://x.com/1")).unwrap();
        let mut news = article("news-one", "https://x.com/2");
        news.article_type = Some(ArticleType::News);
        db.insert_article(&mut news).unwrap();

        assert_eq!(db.list_articles(None, None).unwrap().len(), 2);
        let only_news = db.list_articles(Some(ArticleType::News), None).unwrap();
        assert_eq!(only_news.len(), 1);
        assert_eq!(only_news[0].slug, "news-one");
        assert_eq!(db.list_articles(None, Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn refs_feed_the_resolver() {
        let (_dir, db) = setup();
        let mut a = article("my-title", "http://x.com");
        a.cover_image = Some("my-title.jpg".to_string());
        db.insert_article(&mut a).unwrap();

        let refs = db.article_refs().unwrap();
        let found = refs.lookup("my-title").unwrap();
        assert_eq!(found.tags, RawTags::Encoded(r#"["rust","cli"]"#.to_string()));

        let mut doc = parse("## 深度文章\n### My Title\n<!-- SLUG: my-title -->\nbody");
        doc.enrich(&refs);
        let block = &doc.article_blocks[0];
        assert_eq!(block.url, "http://x.com");
        assert_eq!(block.cover_image.as_deref(), Some("my-title.jpg"));
        assert_eq!(block.tags, vec!["rust", "cli"]);
    }

    #[test]
    fn issues_upsert_by_slug() {
        let (_dir, db) = setup();
        let date = NaiveDate::from_ymd_opt(2026, 1, 22).unwrap();

        let mut issue = Issue::for_week(date, IssueType::Tech, "first");
        let id = db.save_issue(&mut issue).unwrap();

        let mut again = Issue::for_week(date, IssueType::Tech, "second");
        assert_eq!(db.save_issue(&mut again).unwrap(), id);

        let stored = db.issue_by_slug("2026-W04-tech").unwrap().unwrap();
        assert_eq!(stored.content, "second");
        assert_eq!(stored.start_date, "2026-01-19");
        assert_eq!(stored.issue_type, IssueType::Tech);

        let mut news = Issue::for_week(date, IssueType::News, "n");
        db.save_issue(&mut news).unwrap();
        assert_eq!(db.list_issues(None).unwrap().len(), 2);
        assert_eq!(db.list_issues(Some(IssueType::News)).unwrap().len(), 1);
    }

    #[test]
    fn articles_by_slugs_keeps_order() {
        let (_dir, db) = setup();
        db.insert_article(&mut article("one", "https://x.com/1")).unwrap();
        db.insert_article(&mut article("two", "https://x.com/2")).unwrap();

        let found = db.articles_by_slugs(&["two", "missing", "one"]).unwrap();
        let slugs: Vec<_> = found.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, vec!["two", "one"]);
    }
}
