//! PGG-base: a SQLite database storing pan-genome graphs for a set of contigs.
//!
//! Each contig is an independent record with a header row in table `Contigs`.
//! Node labels are stored in table `Sequences` in blocks of [`PggBase::BLOCK_SIZE`] nodes, three bases per byte.
//! Edges are stored in table `Edges` in blocks of [`PggBase::BLOCK_SIZE`] edges.
//! Within a block, each edge is a pair of variable-length integers: the zigzag-encoded difference from the source of the previous edge to the source of this edge, and from the source to the destination.
//!
//! A graph is always written in a single transaction.
//! A database therefore never contains a partially saved graph.

use crate::PanGraph;
use crate::graph::Edge;
use crate::utils;

use std::fs;
use std::path::Path;

use gbwt::support::{ByteCode, ByteCodeIter};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Statement, Transaction};


//-----------------------------------------------------------------------------

/// A database connection to a PGG-base database.
///
/// This structure stores a database connection and the database version.
/// In multi-threaded applications, each thread should have its own connection.
///
/// # Examples
///
/// ```
/// use pgg_base::{utils, PanGraph, PggBase};
/// use simple_sds::serialize;
/// use std::fs;
///
/// // Create the database.
/// let db_file = serialize::temp_file_name("pgg-base");
/// assert!(!utils::file_exists(&db_file));
/// assert!(PggBase::create(&db_file).is_ok());
///
/// // Store a graph.
/// let mut graph = PanGraph::from_reference("chr1", b"ACGTACGT");
/// graph.add_deletion(3, 2).unwrap();
/// let mut database = PggBase::open_mut(&db_file).unwrap();
/// database.save_graph(&graph).unwrap();
/// drop(database);
///
/// // Load it again.
/// let database = PggBase::open(&db_file).unwrap();
/// assert_eq!(database.contig_names().unwrap(), vec![String::from("chr1")]);
/// let loaded = database.load_graph("chr1").unwrap();
/// assert_eq!(loaded, Some(graph));
/// assert!(database.load_graph("chr2").unwrap().is_none());
///
/// // Clean up.
/// drop(database);
/// fs::remove_file(&db_file).unwrap();
/// ```
#[derive(Debug)]
pub struct PggBase {
    connection: Connection,
    version: String,
}

/// Using the database.
impl PggBase {
    // Key for database version.
    const KEY_VERSION: &'static str = "version";

    /// Current database version.
    pub const VERSION: &'static str = "PGG-base v0.1.0";

    /// Number of node labels or edges in a stored block.
    pub const BLOCK_SIZE: usize = 65536;

    /// Opens a read-only connection to the database in the given file.
    ///
    /// Checks the database version and passes through any database errors.
    pub fn open<P: AsRef<Path>>(filename: P) -> Result<Self, String> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Self::open_with_flags(filename, flags)
    }

    /// Opens a read-write connection to the database in the given file.
    ///
    /// Checks the database version and passes through any database errors.
    pub fn open_mut<P: AsRef<Path>>(filename: P) -> Result<Self, String> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Self::open_with_flags(filename, flags)
    }

    fn open_with_flags<P: AsRef<Path>>(filename: P, flags: OpenFlags) -> Result<Self, String> {
        let connection = Connection::open_with_flags(&filename, flags).map_err(|x| {
            format!("Cannot open database {}: {}", filename.as_ref().display(), x)
        })?;

        let mut get_tag = connection.prepare(
            "SELECT value FROM Tags WHERE key = ?1"
        ).map_err(|x| x.to_string())?;
        let version = get_string_value(&mut get_tag, Self::KEY_VERSION)?;
        if version != Self::VERSION {
            return Err(format!("Unsupported database version: {} (expected {})", version, Self::VERSION));
        }
        drop(get_tag);

        Ok(PggBase { connection, version })
    }

    /// Returns `true` if the database `filename` exists.
    pub fn exists<P: AsRef<Path>>(filename: P) -> bool {
        utils::file_exists(filename)
    }

    /// Returns the filename of the database or [`None`] if there is no filename.
    pub fn filename(&self) -> Option<&str> {
        self.connection.path()
    }

    /// Returns the size of the database file in a human-readable format.
    pub fn file_size(&self) -> Option<String> {
        let filename = self.filename()?;
        utils::file_size(filename)
    }

    /// Returns the version of the database.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the number of stored contigs.
    pub fn contigs(&self) -> Result<usize, String> {
        self.connection.query_row(
            "SELECT COUNT(*) FROM Contigs",
            (),
            |row| row.get(0)
        ).map_err(|x| x.to_string())
    }

    /// Returns the names of the stored contigs in the order they were first saved.
    pub fn contig_names(&self) -> Result<Vec<String>, String> {
        let mut statement = self.connection.prepare(
            "SELECT name FROM Contigs ORDER BY handle"
        ).map_err(|x| x.to_string())?;
        let rows = statement.query_map((), |row| row.get::<_, String>(0)).map_err(|x| x.to_string())?;
        let mut result = Vec::new();
        for name in rows {
            result.push(name.map_err(|x| x.to_string())?);
        }
        Ok(result)
    }

    /// Returns `true` if the database contains a graph for the contig.
    pub fn has_graph(&self, contig: &str) -> Result<bool, String> {
        let handle: Option<usize> = self.connection.query_row(
            "SELECT handle FROM Contigs WHERE name = ?1",
            (contig,),
            |row| row.get(0)
        ).optional().map_err(|x| x.to_string())?;
        Ok(handle.is_some())
    }
}

//-----------------------------------------------------------------------------

/// Creating the database.
impl PggBase {
    /// Creates a new empty database in the given file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file already exists.
    /// Passes through any database errors.
    pub fn create<P: AsRef<Path>>(filename: P) -> Result<(), String> {
        if utils::file_exists(&filename) {
            return Err(format!("Database {} already exists", filename.as_ref().display()));
        }

        let mut connection = Connection::open(&filename).map_err(|x| x.to_string())?;
        Self::create_tables(&mut connection).map_err(|x| x.to_string())?;
        Ok(())
    }

    fn create_tables(connection: &mut Connection) -> rusqlite::Result<()> {
        let transaction = connection.transaction()?;

        transaction.execute(
            "CREATE TABLE Tags (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            ) STRICT",
            (),
        )?;
        transaction.execute(
            "INSERT INTO Tags(key, value) VALUES (?1, ?2)",
            (Self::KEY_VERSION, Self::VERSION),
        )?;

        transaction.execute(
            "CREATE TABLE Contigs (
                handle INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                reference_len INTEGER NOT NULL,
                nodes INTEGER NOT NULL,
                edges INTEGER NOT NULL
            ) STRICT",
            (),
        )?;

        transaction.execute(
            "CREATE TABLE Sequences (
                contig INTEGER NOT NULL,
                block INTEGER NOT NULL,
                sequence BLOB NOT NULL,
                PRIMARY KEY (contig, block)
            ) STRICT",
            (),
        )?;

        transaction.execute(
            "CREATE TABLE Edges (
                contig INTEGER NOT NULL,
                block INTEGER NOT NULL,
                edges BLOB NOT NULL,
                PRIMARY KEY (contig, block)
            ) STRICT",
            (),
        )?;

        transaction.commit()
    }
}

//-----------------------------------------------------------------------------

/// Loading and saving graphs.
impl PggBase {
    /// Loads the graph for the contig, or returns [`None`] if the contig is not in the database.
    ///
    /// The loaded graph continues allocating node identifiers after the largest stored identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if a block is missing, the stored counts do not match the blocks, or the stored graph is otherwise invalid.
    /// Passes through any database errors.
    pub fn load_graph(&self, contig: &str) -> Result<Option<PanGraph>, String> {
        let header: Option<(usize, usize, usize, usize)> = self.connection.query_row(
            "SELECT handle, reference_len, nodes, edges FROM Contigs WHERE name = ?1",
            (contig,),
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        ).optional().map_err(|x| x.to_string())?;
        let (handle, reference_len, nodes, edge_count) = match header {
            Some(header) => header,
            None => return Ok(None),
        };

        // Node labels.
        let mut labels: Vec<u8> = Vec::with_capacity(nodes);
        let mut get_sequences = self.connection.prepare(
            "SELECT block, sequence FROM Sequences WHERE contig = ?1 ORDER BY block"
        ).map_err(|x| x.to_string())?;
        let mut rows = get_sequences.query((handle,)).map_err(|x| x.to_string())?;
        let mut expected = 0;
        while let Some(row) = rows.next().map_err(|x| x.to_string())? {
            let block: usize = row.get(0).map_err(|x| x.to_string())?;
            if block != expected {
                return Err(format!("Contig {}: missing sequence block {}", contig, expected));
            }
            let encoded: Vec<u8> = row.get(1).map_err(|x| x.to_string())?;
            labels.extend(utils::decode_sequence(&encoded));
            expected += 1;
        }
        if labels.len() != nodes {
            return Err(format!("Contig {}: expected {} nodes, found {}", contig, nodes, labels.len()));
        }

        // Edges.
        let mut edges: Vec<Edge> = Vec::with_capacity(edge_count);
        let mut get_edges = self.connection.prepare(
            "SELECT block, edges FROM Edges WHERE contig = ?1 ORDER BY block"
        ).map_err(|x| x.to_string())?;
        let mut rows = get_edges.query((handle,)).map_err(|x| x.to_string())?;
        let mut expected = 0;
        while let Some(row) = rows.next().map_err(|x| x.to_string())? {
            let block: usize = row.get(0).map_err(|x| x.to_string())?;
            if block != expected {
                return Err(format!("Contig {}: missing edge block {}", contig, expected));
            }
            let encoded: Vec<u8> = row.get(1).map_err(|x| x.to_string())?;
            decode_edges(&encoded, &mut edges).map_err(|x| format!("Contig {}: edge block {}: {}", contig, block, x))?;
            expected += 1;
        }
        if edges.len() != edge_count {
            return Err(format!("Contig {}: expected {} edges, found {}", contig, edge_count, edges.len()));
        }

        PanGraph::from_parts(contig, reference_len, labels, edges).map(Some)
    }

    /// Saves the graph, replacing any stored graph for the same contig.
    ///
    /// The graph is written in a single transaction.
    /// Passes through any database errors, including when the connection is read-only.
    pub fn save_graph(&mut self, graph: &PanGraph) -> Result<(), String> {
        let transaction = self.connection.transaction().map_err(|x| x.to_string())?;
        Self::replace_graph(&transaction, graph).map_err(|x| {
            format!("Cannot save contig {}: {}", graph.contig(), x)
        })?;
        transaction.commit().map_err(|x| x.to_string())
    }

    fn replace_graph(transaction: &Transaction, graph: &PanGraph) -> rusqlite::Result<()> {
        let mut get_handle = transaction.prepare(
            "SELECT handle FROM Contigs WHERE name = ?1"
        )?;
        let existing: Option<usize> = get_handle.query_row((graph.contig(),), |row| row.get(0)).optional()?;
        let handle = match existing {
            Some(handle) => {
                transaction.execute("DELETE FROM Sequences WHERE contig = ?1", (handle,))?;
                transaction.execute("DELETE FROM Edges WHERE contig = ?1", (handle,))?;
                transaction.execute(
                    "UPDATE Contigs SET reference_len = ?2, nodes = ?3, edges = ?4 WHERE handle = ?1",
                    (handle, graph.reference_len(), graph.nodes(), graph.edge_count()),
                )?;
                handle
            },
            None => {
                transaction.execute(
                    "INSERT INTO Contigs(name, reference_len, nodes, edges) VALUES (?1, ?2, ?3, ?4)",
                    (graph.contig(), graph.reference_len(), graph.nodes(), graph.edge_count()),
                )?;
                get_handle.query_row((graph.contig(),), |row| row.get(0))?
            },
        };

        let mut insert_sequence = transaction.prepare(
            "INSERT INTO Sequences(contig, block, sequence) VALUES (?1, ?2, ?3)"
        )?;
        for (block, labels) in graph.labels().chunks(Self::BLOCK_SIZE).enumerate() {
            insert_sequence.execute((handle, block, utils::encode_sequence(labels)))?;
        }

        let mut insert_edges = transaction.prepare(
            "INSERT INTO Edges(contig, block, edges) VALUES (?1, ?2, ?3)"
        )?;
        for (block, edges) in graph.edges().chunks(Self::BLOCK_SIZE).enumerate() {
            insert_edges.execute((handle, block, encode_edges(edges)))?;
        }

        Ok(())
    }
}

//-----------------------------------------------------------------------------

// Encodes a block of edges as pairs of zigzag-encoded differences.
fn encode_edges(edges: &[Edge]) -> Vec<u8> {
    let mut encoder = ByteCode::new();
    let mut prev = 0;
    for (from, to) in edges.iter() {
        encoder.write(utils::zigzag_diff(prev, *from));
        encoder.write(utils::zigzag_diff(*from, *to));
        prev = *from;
    }
    Vec::from(encoder)
}

// Decodes a block of edges created with `encode_edges` and appends them to the vector.
fn decode_edges(encoded: &[u8], edges: &mut Vec<Edge>) -> Result<(), String> {
    let mut decoder = ByteCodeIter::new(encoded);
    let mut prev = 0;
    let mut count = 0;
    while let Some(value) = decoder.next() {
        let from = utils::zigzag_apply(prev, value).ok_or(
            format!("Invalid source for edge {} in the block", count)
        )?;
        let to = decoder.next().and_then(|x| utils::zigzag_apply(from, x)).ok_or(
            format!("Invalid destination for edge {} in the block", count)
        )?;
        edges.push((from, to));
        prev = from;
        count += 1;
    }
    Ok(())
}

//-----------------------------------------------------------------------------

/// Type of a potential database file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseFileType {
    /// The file does not exist.
    Missing,
    /// The file is not a valid SQLite database.
    NotDatabase,
    /// The file is an unknown SQLite database.
    UnknownDatabase,
    /// The file is a known SQLite database with the given version string.
    Version(String),
}

/// Determines the type of the given file, which may be a SQLite database.
pub fn identify_database<P: AsRef<Path>>(filename: P) -> DatabaseFileType {
    let metadata = match fs::metadata(&filename) {
        Ok(metadata) => metadata,
        Err(_) => return DatabaseFileType::Missing,
    };
    if !metadata.is_file() {
        return DatabaseFileType::NotDatabase;
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let connection = match Connection::open_with_flags(filename, flags) {
        Ok(connection) => connection,
        Err(_) => return DatabaseFileType::NotDatabase,
    };

    let mut statement = match connection.prepare("SELECT value FROM Tags WHERE key = 'version'") {
        Ok(statement) => statement,
        // Opening is lazy, so a file that is not a database fails only here.
        Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == rusqlite::ErrorCode::NotADatabase => {
            return DatabaseFileType::NotDatabase;
        },
        Err(_) => return DatabaseFileType::UnknownDatabase,
    };

    let version: rusqlite::Result<String> = statement.query_row([], |row| row.get(0));
    match version {
        Ok(version) => DatabaseFileType::Version(version),
        Err(_) => DatabaseFileType::UnknownDatabase,
    }
}

// Executes the statement, which is expected to return a single string value.
fn get_string_value(statement: &mut Statement, key: &str) -> Result<String, String> {
    let result: rusqlite::Result<String> = statement.query_row(
        (key,),
        |row| row.get(0)
    );
    match result {
        Ok(value) => Ok(value),
        Err(x) => Err(format!("Key not found: {} ({})", key, x)),
    }
}

//-----------------------------------------------------------------------------
