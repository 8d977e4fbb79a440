use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cardpipe_rfc::vcard::core::names;
use cardpipe_rfc::vcard::{VCard, VCardParameter, VCardProperty, VCardValue};

use super::{X_CLASS, invalid, text_value, unexpected};
use crate::contact::{Contact, ContactField, Photo};
use crate::error::MappingError;
use crate::mapping::{FieldMapping, MappingContext};

/// PHOTO. Inline images are `ENCODING=b` binary in vCard 3.0 and `data:` URIs
/// in 4.0.
pub struct PhotoMapping;

impl PhotoMapping {
    fn media_type(prop: &VCardProperty) -> Option<String> {
        if let Some(media_type) = prop.get_param_value("MEDIATYPE") {
            return Some(media_type.to_ascii_lowercase());
        }
        let image_type = prop.get_param_value("TYPE")?.to_ascii_lowercase();
        Some(if image_type.contains('/') {
            image_type
        } else {
            format!("image/{image_type}")
        })
    }

    fn parse_data_uri(rest: &str) -> Result<Photo, MappingError> {
        let Some((meta, payload)) = rest.split_once(',') else {
            return Err(invalid(ContactField::Photo, "data URI without a payload"));
        };
        let (media_type, is_base64) = match meta.strip_suffix(";base64") {
            Some(media_type) => (media_type, true),
            None => (meta, false),
        };
        let data = if is_base64 {
            STANDARD
                .decode(payload)
                .map_err(|err| invalid(ContactField::Photo, format!("bad base64 payload: {err}")))?
        } else {
            payload.as_bytes().to_vec()
        };
        Ok(Photo::Inline {
            media_type: (!media_type.is_empty()).then(|| media_type.to_ascii_lowercase()),
            data,
        })
    }

    fn read(prop: &VCardProperty) -> Result<Photo, MappingError> {
        match &prop.value {
            VCardValue::Binary(data) => Ok(Photo::Inline {
                media_type: Self::media_type(prop),
                data: data.clone(),
            }),
            VCardValue::Uri(uri) | VCardValue::Text(uri) => match uri.get(..5) {
                Some(scheme) if scheme.eq_ignore_ascii_case("data:") => {
                    Self::parse_data_uri(&uri[5..])
                }
                _ => Ok(Photo::Uri(uri.clone())),
            },
            _ => Err(unexpected(prop)),
        }
    }
}

impl FieldMapping for PhotoMapping {
    fn name(&self) -> &'static str {
        names::PHOTO
    }

    fn property_names(&self) -> &'static [&'static str] {
        &[names::PHOTO]
    }

    fn domain_fields(&self) -> &'static [ContactField] {
        &[ContactField::Photo]
    }

    fn import(
        &self,
        card: &VCard,
        contact: &mut Contact,
        _ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        contact.photo = match card.get_property(names::PHOTO) {
            Some(prop) => Some(Self::read(prop)?),
            None => None,
        };
        Ok(())
    }

    fn export(
        &self,
        contact: &Contact,
        card: &mut VCard,
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        let Some(photo) = &contact.photo else {
            return Ok(());
        };

        let prop = match photo {
            Photo::Uri(uri) if ctx.is_v3() => VCardProperty::uri(names::PHOTO, uri)
                .with_param(VCardParameter::new(VCardParameter::VALUE, "uri")),
            Photo::Uri(uri) => VCardProperty::uri(names::PHOTO, uri),
            Photo::Inline { media_type, data } if ctx.is_v3() => {
                let mut prop = VCardProperty::new(names::PHOTO, VCardValue::Binary(data.clone()));
                if let Some(media_type) = media_type {
                    let subtype = media_type.rsplit('/').next().unwrap_or(media_type);
                    prop.add_type(subtype.to_ascii_uppercase());
                }
                prop
            }
            Photo::Inline { media_type, data } => VCardProperty::uri(
                names::PHOTO,
                format!(
                    "data:{};base64,{}",
                    media_type.as_deref().unwrap_or_default(),
                    STANDARD.encode(data)
                ),
            ),
        };
        card.add_property(prop);
        Ok(())
    }
}

/// CLASS. Dropped from vCard 4.0, where `X-CLASS` carries it instead.
pub struct ClassMapping;

impl FieldMapping for ClassMapping {
    fn name(&self) -> &'static str {
        names::CLASS
    }

    fn property_names(&self) -> &'static [&'static str] {
        &[names::CLASS, X_CLASS]
    }

    fn domain_fields(&self) -> &'static [ContactField] {
        &[ContactField::Private]
    }

    fn import(
        &self,
        card: &VCard,
        contact: &mut Contact,
        _ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        contact.private = match card
            .get_property(names::CLASS)
            .or_else(|| card.get_property(X_CLASS))
        {
            Some(prop) => {
                let class = text_value(prop)?.trim();
                class.eq_ignore_ascii_case("PRIVATE") || class.eq_ignore_ascii_case("CONFIDENTIAL")
            }
            None => false,
        };
        Ok(())
    }

    fn export(
        &self,
        contact: &Contact,
        card: &mut VCard,
        ctx: &mut MappingContext<'_>,
    ) -> Result<(), MappingError> {
        if contact.private {
            let name = if ctx.is_v3() { names::CLASS } else { X_CLASS };
            card.add_property(VCardProperty::text(name, "PRIVATE"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_with_media_type() {
        let photo = PhotoMapping::parse_data_uri("image/png;base64,cG5n").unwrap();
        assert_eq!(
            photo,
            Photo::Inline {
                media_type: Some("image/png".to_string()),
                data: b"png".to_vec()
            }
        );
    }

    #[test]
    fn data_uri_without_payload_is_invalid() {
        assert!(PhotoMapping::parse_data_uri("image/png;base64").is_err());
    }

    #[test]
    fn v3_type_becomes_media_type() {
        let prop = VCardProperty::new(names::PHOTO, VCardValue::Binary(vec![1, 2, 3]))
            .with_param(VCardParameter::type_value("JPEG"));
        assert_eq!(
            PhotoMapping::read(&prop).unwrap(),
            Photo::Inline {
                media_type: Some("image/jpeg".to_string()),
                data: vec![1, 2, 3]
            }
        );
    }
}
