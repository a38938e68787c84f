//! Domain models.

mod image;
mod upload;

pub use image::{
    ImageRecord, ImageRecordUpdate, ImageResponse, ListOrder, NewImageRecord, Pagination,
    SignedUrlResponse, UpdateImageRequest,
};
pub use upload::UploadRequest;
