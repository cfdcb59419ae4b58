//! Functions and other utilities surrounding the [QuadImage] type.

use std::{
    fmt,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    num::ParseIntError,
    path::Path,
};

use thiserror::Error;
use tracing::debug;

use crate::{
    compression::quadtree,
    format::{self, ValueReader},
    node::QuadNode,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid format: {0}")]
    Format(String),

    #[error("malformed integer {token:?} on line {line}")]
    ParseInt {
        line: usize,
        token: String,
        #[source]
        source: ParseIntError,
    },

    #[error("side dimension {0} is not a power of two")]
    Dimension(usize),

    #[error("invalid state: {0}")]
    State(&'static str),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error was caused by bad or unreadable input, as opposed
    /// to calling an operation at the wrong time.
    pub fn is_format(&self) -> bool {
        !matches!(self, Error::State(_))
    }
}

/// Where a [QuadImage] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Nothing has been loaded.
    #[default]
    Empty,

    /// Raw pixels were loaded, there is no tree yet.
    RawLoaded,

    /// The loaded raw pixels have been compressed into a tree.
    Compressed,

    /// A tree was loaded from a compressed image, there are no pixels yet.
    CompressedLoaded,

    /// The loaded tree has been expanded back into pixels.
    Uncompressed,
}

/// Settings for [QuadImage::compress_with].
#[derive(Debug, Clone, Copy)]
pub struct CompressOptions {
    /// Compress the quadrants of large blocks on the rayon thread pool.
    /// The resulting tree is identical either way.
    pub parallel: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// A square grayscale image, as a matrix of pixels, a quadtree, or both.
#[derive(Debug, Clone, Default)]
pub struct QuadImage {
    /// Length of one side, a power of two. Zero until something is loaded.
    side_dim: usize,

    /// Total number of pixels, always `side_dim²`.
    pixel_count: usize,

    /// The pixel matrix, indexed `[row][col]`.
    raw_pixels: Option<Vec<Vec<u8>>>,

    root: Option<QuadNode>,

    /// Nodes written by the last [QuadImage::write_compressed], or nodes
    /// read when the image came from a compressed file.
    compressed_size: Option<usize>,

    state: State,
}

impl QuadImage {
    /// Create an empty image. It must be loaded before anything else can be
    /// done with it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an image from row-major pixel values.
    pub fn from_raw_pixels(pixels: &[u8]) -> Result<Self, Error> {
        let side_dim = format::side_for_count(pixels.len())?;
        let matrix: Vec<Vec<u8>> = pixels
            .chunks_exact(side_dim)
            .map(|row| row.to_vec())
            .collect();

        debug!(side_dim, "loaded raw image");

        Ok(Self {
            side_dim,
            pixel_count: pixels.len(),
            raw_pixels: Some(matrix),
            state: State::RawLoaded,
            ..Default::default()
        })
    }

    /// Read a raw image from anything that implements [Read].
    pub fn from_raw_reader<I: Read>(input: I) -> Result<Self, Error> {
        let pixels = format::read_raw(BufReader::new(input))?;
        Self::from_raw_pixels(&pixels)
    }

    /// Open a raw image file.
    pub fn open_raw<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_raw_reader(File::open(path)?)
    }

    /// Read a compressed image from anything that implements [Read].
    pub fn from_compressed<I: Read>(input: I) -> Result<Self, Error> {
        let mut reader = ValueReader::new(BufReader::new(input));

        let (pixel_count, side_dim) = format::read_header(&mut reader)?;
        let (root, node_count) = format::read_tree(&mut reader, side_dim)?;

        debug!(side_dim, node_count, "loaded compressed image");

        Ok(Self {
            side_dim,
            pixel_count,
            root: Some(root),
            compressed_size: Some(node_count),
            state: State::CompressedLoaded,
            ..Default::default()
        })
    }

    /// Create an image from an already built tree covering a
    /// `side_dim`×`side_dim` block.
    pub fn from_tree(root: QuadNode, side_dim: usize) -> Result<Self, Error> {
        if !side_dim.is_power_of_two() {
            return Err(Error::Dimension(side_dim));
        }

        if root.depth() > side_dim.trailing_zeros() {
            return Err(Error::Format(format!(
                "tree of depth {} is too deep for a side of {side_dim}",
                root.depth()
            )));
        }

        Ok(Self {
            side_dim,
            pixel_count: side_dim * side_dim,
            compressed_size: Some(root.node_count()),
            root: Some(root),
            state: State::CompressedLoaded,
            ..Default::default()
        })
    }

    /// Build the quadtree from the loaded pixels, in parallel for large
    /// images.
    pub fn compress(&mut self) -> Result<(), Error> {
        self.compress_with(CompressOptions::default())
    }

    /// Build the quadtree from the loaded pixels.
    pub fn compress_with(&mut self, options: CompressOptions) -> Result<(), Error> {
        let pixels = self
            .raw_pixels
            .as_ref()
            .ok_or(Error::State("cannot compress without a raw image"))?;

        let root = quadtree::compress(pixels, self.side_dim, options.parallel);
        debug!(side_dim = self.side_dim, nodes = root.node_count(), "compressed image");

        self.root = Some(root);
        self.compressed_size = None;
        self.state = State::Compressed;

        Ok(())
    }

    /// Expand the quadtree back into a matrix of pixels.
    pub fn uncompress(&mut self) -> Result<(), Error> {
        let root = self
            .root
            .as_ref()
            .ok_or(Error::State("cannot uncompress without a tree"))?;

        let pixels = quadtree::decompress(root, self.side_dim)?;
        debug!(side_dim = self.side_dim, "uncompressed image");

        self.raw_pixels = Some(pixels);
        self.state = State::Uncompressed;

        Ok(())
    }

    /// Write the compressed image into anything that implements [Write].
    ///
    /// Returns the number of tree nodes written, which is also available
    /// afterwards from [QuadImage::compressed_size].
    pub fn write_compressed<O: Write>(&mut self, mut output: O) -> Result<usize, Error> {
        let root = self
            .root
            .as_ref()
            .ok_or(Error::State("cannot write a compressed image without a tree"))?;

        writeln!(output, "{}", self.pixel_count)?;
        let written = format::write_tree(&mut output, root)?;
        output.flush()?;

        debug!(pixel_count = self.pixel_count, written, "wrote compressed image");
        self.compressed_size = Some(written);

        Ok(written)
    }

    /// Write the compressed image to a file.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, Error> {
        let output = BufWriter::new(File::create(path)?);
        self.write_compressed(output)
    }

    /// Write the pixels as a raw image into anything that implements
    /// [Write].
    pub fn write_raw<O: Write>(&self, mut output: O) -> Result<(), Error> {
        format::write_raw(&mut output, self.raw_image()?)?;
        output.flush()?;

        Ok(())
    }

    /// Write the pixels to a raw image file.
    pub fn save_raw<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        self.write_raw(BufWriter::new(File::create(path)?))
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Length of one side of the image, zero if nothing is loaded.
    pub fn side_dim(&self) -> usize {
        self.side_dim
    }

    /// The pixel matrix, indexed `[row][col]`.
    pub fn raw_image(&self) -> Result<&[Vec<u8>], Error> {
        self.raw_pixels
            .as_deref()
            .ok_or(Error::State("no raw image is loaded"))
    }

    /// Total number of pixels in the image.
    pub fn raw_size(&self) -> Result<usize, Error> {
        match self.state {
            State::Empty => Err(Error::State("no image is loaded")),
            _ => Ok(self.pixel_count),
        }
    }

    /// Number of nodes in the compressed file written or read.
    pub fn compressed_size(&self) -> Result<usize, Error> {
        self.compressed_size
            .ok_or(Error::State("no compressed image has been written or read"))
    }

    pub fn root(&self) -> Result<&QuadNode, Error> {
        self.root.as_ref().ok_or(Error::State("no tree is present"))
    }

    /// Consume the image, returning its pixels as a flat row-major buffer.
    pub fn into_raw(self) -> Result<Vec<u8>, Error> {
        let pixels = self
            .raw_pixels
            .ok_or(Error::State("no raw image is loaded"))?;

        Ok(pixels.into_iter().flatten().collect())
    }
}

/// The preorder rendering of the tree, or `NO TREE`.
impl fmt::Display for QuadImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{root}"),
            None => write!(f, "NO TREE"),
        }
    }
}

/// Open a compressed image file.
pub fn open<P: AsRef<Path>>(path: P) -> Result<QuadImage, Error> {
    let input = File::open(path)?;
    QuadImage::from_compressed(input)
}
