//! Object keys and public URLs.

use uuid::Uuid;

use crate::job::MediaKind;

/// Generates a new, globally unique object key for `kind`.
pub fn object_key(kind: MediaKind) -> String {
    format!("{}.{}", Uuid::new_v4(), kind.extension())
}

/// Public virtual-hosted-style URL of an object.
pub fn public_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_object_key_shape() {
        let key = object_key(MediaKind::Video);
        let (stem, ext) = key.rsplit_once('.').unwrap();
        assert_eq!(ext, "mp4");
        assert!(Uuid::parse_str(stem).is_ok());

        assert!(object_key(MediaKind::Image).ends_with(".jpg"));
    }

    #[test]
    fn test_object_keys_are_unique() {
        let keys: HashSet<_> = (0..1000).map(|_| object_key(MediaKind::Image)).collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            public_url("bucket", "region", "abc.jpg"),
            "https://bucket.s3.region.amazonaws.com/abc.jpg"
        );
    }
}
