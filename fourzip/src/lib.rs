//! FourZip is a lossless compressor for square grayscale images whose side
//! length is a power of two. Uniform blocks of the image are collapsed into
//! the leaves of a quadtree, and the tree is stored as plain text, one node
//! per line.
//!
//! Images come in two text formats. A *raw* image is one pixel value (0-255)
//! per line in row-major order. A *compressed* image is the total pixel count
//! followed by a preorder walk of the tree; see [format] for details.
//!
//! # Example
//! ## Compressing a raw image
//! ```no_run
//! use fourzip::QuadImage;
//!
//! // A 2×2 image. Nothing is compressed at this point.
//! let mut image = QuadImage::from_raw_pixels(&[1, 2, 3, 4])
//!     .expect("Not a valid image");
//!
//! // Build the quadtree, then write it out.
//! image.compress().expect("No raw image loaded");
//! image.save("my_image.fz").expect("Could not save the image");
//!
//! println!("{image}"); // (1 2 3 4)
//! ```
//!
//! ## Reading a compressed image
//! ```no_run
//! // Load it directly with the `open` function...
//! let mut image = fourzip::open("my_image.fz").expect("Could not open file");
//!
//! // ...then expand the tree back into pixels.
//! image.uncompress().expect("No tree loaded");
//! let side = image.side_dim();
//! let pixels = image.into_raw().expect("No pixels");
//! assert_eq!(pixels.len(), side * side);
//! ```

mod compression {
    pub mod quadtree;
}

pub mod coordinate;
pub mod format;
pub mod node;
pub mod picture;

// ----------------------- //
// INLINED USEFUL FEATURES //
// ----------------------- //
#[doc(inline)]
pub use picture::QuadImage;

#[doc(inline)]
pub use picture::open;

#[doc(inline)]
pub use picture::{CompressOptions, Error, State};

#[doc(inline)]
pub use node::QuadNode;

#[doc(inline)]
pub use coordinate::{Coordinate, Quadrant};

pub use compression::quadtree::PARALLEL_THRESHOLD;
