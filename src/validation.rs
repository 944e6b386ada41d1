use crate::error::UploaderError;

/// Check that the selected file name carries the accepted extension
pub fn validate_extension(file_name: &str, accepted_extension: &str) -> Result<(), UploaderError> {
    if !file_name.ends_with(accepted_extension) {
        return Err(UploaderError::Validation(format!(
            "Only {} files are supported: {}",
            accepted_extension, file_name
        )));
    }
    Ok(())
}

/// Validate file size is within the specified limit (inclusive)
pub fn validate_file_size(file_name: &str, size: u64, max_size: u64) -> Result<u64, UploaderError> {
    if size > max_size {
        return Err(UploaderError::Validation(format!(
            "File size ({} bytes) exceeds maximum allowed size ({} bytes): {}",
            size, max_size, file_name
        )));
    }

    Ok(size)
}

/// Extension first, then size; no I/O either way
pub fn validate_upload_file(
    file_name: &str,
    size: u64,
    accepted_extension: &str,
    max_size: u64,
) -> Result<u64, UploaderError> {
    validate_extension(file_name, accepted_extension)?;
    validate_file_size(file_name, size, max_size)
}
