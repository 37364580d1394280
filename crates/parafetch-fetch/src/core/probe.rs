use crate::data::{HeadInfo, ResourceInfo};

/// `Accept-Ranges` advertises range support unless it is absent or `none`.
pub fn supports_range(accept_ranges: Option<&str>) -> bool {
    accept_ranges.is_some_and(|v| !v.trim().eq_ignore_ascii_case("none"))
}

/// Interpret probe headers. Fails with a reason when the length is unknown.
pub fn resource_info(head: &HeadInfo) -> Result<ResourceInfo, String> {
    let total_len = head
        .content_length
        .ok_or_else(|| "response carries no Content-Length".to_string())?;

    Ok(ResourceInfo {
        total_len,
        supports_range: supports_range(head.accept_ranges.as_deref()),
        suggested_name: head
            .content_disposition
            .as_deref()
            .and_then(super::filename::disposition_filename),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_range() {
        assert!(supports_range(Some("bytes")));
        assert!(supports_range(Some(" Bytes ")));
        assert!(!supports_range(Some("none")));
        assert!(!supports_range(Some("NONE")));
        assert!(!supports_range(None));
    }

    #[test]
    fn test_resource_info_from_headers() {
        let head = HeadInfo {
            content_length:      Some(1000),
            accept_ranges:       Some("bytes".into()),
            content_disposition: Some(r#"attachment; filename="report.pdf""#.into()),
        };
        assert_eq!(
            resource_info(&head).unwrap(),
            ResourceInfo {
                total_len:      1000,
                supports_range: true,
                suggested_name: Some("report.pdf".into()),
            }
        );
    }

    #[test]
    fn test_missing_length_is_an_error() {
        let head = HeadInfo {
            accept_ranges: Some("bytes".into()),
            ..HeadInfo::default()
        };
        assert!(resource_info(&head).is_err());
    }

    #[test]
    fn test_zero_length_is_valid() {
        let head = HeadInfo {
            content_length: Some(0),
            ..HeadInfo::default()
        };
        let info = resource_info(&head).unwrap();
        assert_eq!(info.total_len, 0);
        assert!(!info.supports_range);
    }
}
