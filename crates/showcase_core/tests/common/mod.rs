#![allow(dead_code)]

use rusqlite::{params, Connection};
use showcase_core::{
    open_db, open_db_in_memory, SampleRequest, SamplingConfig, SamplingService, Seed,
    SqliteSamplingRepository,
};
use std::path::Path;
use uuid::Uuid;

/// Catalog database populated through plain SQL.
pub struct Fixture {
    pub conn: Connection,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            conn: open_db_in_memory().unwrap(),
        }
    }

    pub fn at(path: &Path) -> Self {
        Self {
            conn: open_db(path).unwrap(),
        }
    }

    pub fn service(&mut self) -> SamplingService<SqliteSamplingRepository<'_>> {
        SamplingService::new(SqliteSamplingRepository::try_new(&mut self.conn).unwrap())
    }

    pub fn service_with(
        &mut self,
        config: SamplingConfig,
    ) -> SamplingService<SqliteSamplingRepository<'_>> {
        SamplingService::with_config(
            SqliteSamplingRepository::try_new(&mut self.conn).unwrap(),
            config,
        )
    }

    pub fn owner(&self, label: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO owners (id, label, display_name) VALUES (?1, ?2, ?3);",
                params![id.to_string(), label, label.to_uppercase()],
            )
            .unwrap();
        id
    }

    pub fn creator(&self, owner: Uuid, label: &str, public: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO creators (id, owner_id, name, label, biography, country_code, public)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    id.to_string(),
                    owner.to_string(),
                    format!("Creator {label}"),
                    label,
                    Option::<String>::None,
                    "PT",
                    public,
                ],
            )
            .unwrap();
        id
    }

    pub fn work(&self, creator: Uuid, label: &str, public: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO works (
                    id, creator_id, name, label, description, year,
                    image_hash, image_mime_type, thumbnail_mime_type, public
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
                params![
                    id.to_string(),
                    creator.to_string(),
                    format!("Work {label}"),
                    label,
                    format!("about {label}"),
                    2001_i64,
                    format!("hash-{label}"),
                    "image/png",
                    Option::<String>::None,
                    public,
                ],
            )
            .unwrap();
        id
    }

    pub fn venue(&self, owner: Uuid, label: &str, public: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO venues (id, owner_id, name, label, country_code, public)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    id.to_string(),
                    owner.to_string(),
                    format!("Venue {label}"),
                    label,
                    "DE",
                    public,
                ],
            )
            .unwrap();
        id
    }

    pub fn program(&self, venue: Uuid, label: &str, public: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO programs (id, venue_id, name, label, curator, from_date, to_date, public)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    id.to_string(),
                    venue.to_string(),
                    format!("Program {label}"),
                    label,
                    "Curator",
                    "2024-03-01",
                    "2024-06-30",
                    public,
                ],
            )
            .unwrap();
        id
    }

    pub fn link(&self, program: Uuid, work: Uuid) {
        self.conn
            .execute(
                "INSERT INTO program_works (program_id, work_id) VALUES (?1, ?2);",
                params![program.to_string(), work.to_string()],
            )
            .unwrap();
    }

    /// Public creators `a` and `b` with two public works each, private `c`.
    pub fn worked_example(&self) -> WorkedExample {
        let owner = self.owner("studio");
        let a = self.creator(owner, "a", true);
        let b = self.creator(owner, "b", true);
        let c = self.creator(owner, "c", false);
        for (creator, prefix) in [(a, "a"), (b, "b"), (c, "c")] {
            self.work(creator, &format!("{prefix}-1"), true);
            self.work(creator, &format!("{prefix}-2"), true);
        }
        WorkedExample { a, b, c }
    }

    /// `count` public creators under one owner, each with one public work.
    pub fn many_creators(&self, count: usize) -> Vec<Uuid> {
        let owner = self.owner("crowd");
        (0..count)
            .map(|idx| {
                let creator = self.creator(owner, &format!("c{idx:02}"), true);
                self.work(creator, &format!("w{idx:02}"), true);
                creator
            })
            .collect()
    }

    /// `count` public creators, each with `works_each` public works.
    pub fn prolific_creators(&self, count: usize, works_each: usize) -> Vec<Uuid> {
        let owner = self.owner("atelier");
        (0..count)
            .map(|idx| {
                let creator = self.creator(owner, &format!("p{idx:02}"), true);
                for work in 0..works_each {
                    self.work(creator, &format!("p{idx:02}-{work}"), true);
                }
                creator
            })
            .collect()
    }

    /// `count` public programs in one public venue, each linked to
    /// `works_each` public works.
    pub fn busy_programs(&self, count: usize, works_each: usize) -> Vec<Uuid> {
        let artists = self.owner("ensemble");
        let maker = self.creator(artists, "maker", true);
        let gallery = self.owner("gallery");
        let venue = self.venue(gallery, "hall", true);
        (0..count)
            .map(|idx| {
                let program = self.program(venue, &format!("show{idx:02}"), true);
                for work in 0..works_each {
                    let id = self.work(maker, &format!("show{idx:02}-{work}"), true);
                    self.link(program, id);
                }
                program
            })
            .collect()
    }
}

pub struct WorkedExample {
    pub a: Uuid,
    pub b: Uuid,
    pub c: Uuid,
}

pub fn request(seed: u32, from: u32, count: u32) -> SampleRequest {
    SampleRequest::new(count)
        .with_seed(Seed::new(seed))
        .starting_at(from)
}

pub fn session_seeded(conn: &Connection) -> bool {
    conn.query_row("SELECT session_seeded();", [], |row| row.get(0))
        .unwrap()
}
