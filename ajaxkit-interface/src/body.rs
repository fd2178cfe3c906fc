//! Request payloads.

use std::borrow::Cow;

use serde::Serialize;

/// The body of a request.
///
/// Bodies are plain data so that configurations holding them can be cloned and merged.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Raw bytes sent with the given content type.
    Bytes {
        /// The payload.
        content: Cow<'static, [u8]>,
        /// Value of the `content-type` header.
        content_type: Cow<'static, str>,
    },
    /// `application/x-www-form-urlencoded` fields.
    Form {
        /// The fields, in order.
        fields: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    },
    /// A JSON document sent as `application/json`.
    Json(serde_json::Value),
}

impl Body {
    /// A text body with an explicit content type.
    pub fn text(
        text: impl Into<Cow<'static, str>>,
        content_type: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::Bytes {
            content: match text.into() {
                Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
                Cow::Owned(s) => Cow::Owned(s.into_bytes()),
            },
            content_type: content_type.into(),
        }
    }

    /// A `text/plain` body.
    pub fn plain_text(text: impl Into<Cow<'static, str>>) -> Self {
        Self::text(text, "text/plain")
    }

    /// A raw byte body.
    pub fn bytes(
        bytes: impl Into<Cow<'static, [u8]>>,
        content_type: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::Bytes {
            content: bytes.into(),
            content_type: content_type.into(),
        }
    }

    /// Serializes `value` into a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> crate::Result<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// An urlencoded form body.
    pub fn form<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
    {
        Self::Form {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The value for the `content-type` header.
    pub fn content_type(&self) -> &str {
        match self {
            Self::Bytes { content_type, .. } => content_type,
            Self::Form { .. } => "application/x-www-form-urlencoded",
            Self::Json(_) => "application/json",
        }
    }

    /// Encodes the body into bytes ready for the wire.
    pub fn to_bytes(&self) -> crate::Result<Cow<'_, [u8]>> {
        Ok(match self {
            Self::Bytes { content, .. } => Cow::Borrowed(&**content),
            Self::Form { fields } => Cow::Owned(
                form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields.iter().map(|(k, v)| (&**k, &**v)))
                    .finish()
                    .into_bytes(),
            ),
            Self::Json(value) => Cow::Owned(serde_json::to_vec(value)?),
        })
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::plain_text(text)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::plain_text(text)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::bytes(bytes, "application/octet-stream")
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_body_encoding() {
        let body = Body::plain_text("hello");
        assert_eq!(body.content_type(), "text/plain");
        assert_eq!(&*body.to_bytes().unwrap(), b"hello");

        let body = Body::form([("user", "a b"), ("lang", "zh&en")]);
        assert_eq!(body.content_type(), "application/x-www-form-urlencoded");
        assert_eq!(&*body.to_bytes().unwrap(), b"user=a+b&lang=zh%26en");

        let body: Body = json!({"name": "x"}).into();
        assert_eq!(body.content_type(), "application/json");
        assert_eq!(&*body.to_bytes().unwrap(), br#"{"name":"x"}"#);
    }

    #[test]
    fn test_body_json_serialize() {
        #[derive(Serialize)]
        struct Login<'a> {
            user: &'a str,
            remember: bool,
        }
        let body = Body::json(&Login {
            user: "root",
            remember: true,
        })
        .unwrap();
        assert_eq!(body, Body::Json(json!({"user": "root", "remember": true})));
    }
}
