use api_types::{
    ImageFormatType,
    receipt::{ReceiptImage, ReceiptImageInput},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, receipt_images, transactions, util::detect_image_format,
};

use super::{Engine, with_tx};

fn receipt_from_model(model: receipt_images::Model) -> ResultEngine<ReceiptImage> {
    Ok(ReceiptImage {
        receipt_image_id: model.receipt_image_id,
        transaction_id: model.transaction_id,
        image: STANDARD.encode(&model.image),
        thumbnail: STANDARD.encode(&model.thumbnail),
        image_format_type: model.image_format_type.parse()?,
        active_status: model.active_status,
    })
}

/// Decode base64 image data, tolerating a `data:<mime>;base64,` prefix.
fn decode_image(value: &str, label: &str) -> ResultEngine<Vec<u8>> {
    let value = value.trim();
    let payload = match value.split_once(";base64,") {
        Some((prefix, payload)) if prefix.starts_with("data:") => payload,
        _ => value,
    };
    let bytes = STANDARD
        .decode(payload)
        .map_err(|err| EngineError::InvalidValue(format!("invalid base64 {label}: {err}")))?;
    if bytes.is_empty() {
        return Err(EngineError::InvalidValue(format!("{label} must not be empty")));
    }
    Ok(bytes)
}

fn image_format(bytes: &[u8]) -> ResultEngine<ImageFormatType> {
    match detect_image_format(bytes) {
        ImageFormatType::Undefined => Err(EngineError::InvalidValue(
            "receipt image must be a JPEG or PNG".to_string(),
        )),
        format => Ok(format),
    }
}

impl Engine {
    pub async fn receipt_image(&self, id: i64, owner: &str) -> ResultEngine<ReceiptImage> {
        let model = receipt_images::Entity::find_by_id(id)
            .filter(receipt_images::Column::Owner.eq(owner))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("receipt image {id}")))?;
        receipt_from_model(model)
    }

    /// Attach a receipt image to a transaction, replacing any previous one.
    pub async fn insert_receipt_image(
        &self,
        input: ReceiptImageInput,
        owner: &str,
    ) -> ResultEngine<ReceiptImage> {
        let image = decode_image(&input.image, "image")?;
        let thumbnail = match input.thumbnail.as_deref() {
            Some(thumbnail) if !thumbnail.trim().is_empty() => {
                decode_image(thumbnail, "thumbnail")?
            }
            _ => image.clone(),
        };
        let format = image_format(&image)?;

        with_tx!(self, |db_tx| {
            let transaction = self
                .require_transaction_by_id(&db_tx, input.transaction_id, owner)
                .await?;
            let model = self
                .attach_receipt(
                    &db_tx,
                    transaction,
                    image,
                    thumbnail,
                    format,
                    input.active_status.unwrap_or(true),
                    owner,
                )
                .await?;
            receipt_from_model(model)
        })
    }

    /// Attach a base64 image to the transaction identified by `guid`.
    pub async fn update_transaction_receipt_image(
        &self,
        guid: Uuid,
        image: &str,
        owner: &str,
    ) -> ResultEngine<ReceiptImage> {
        let image = decode_image(image, "image")?;
        let format = image_format(&image)?;
        with_tx!(self, |db_tx| {
            let transaction = self.require_transaction_by_guid(&db_tx, guid, owner).await?;
            let thumbnail = image.clone();
            let model = self
                .attach_receipt(&db_tx, transaction, image, thumbnail, format, true, owner)
                .await?;
            receipt_from_model(model)
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn attach_receipt<C: ConnectionTrait>(
        &self,
        db: &C,
        transaction: transactions::Model,
        image: Vec<u8>,
        thumbnail: Vec<u8>,
        format: ImageFormatType,
        active_status: bool,
        owner: &str,
    ) -> ResultEngine<receipt_images::Model> {
        receipt_images::Entity::delete_many()
            .filter(receipt_images::Column::TransactionId.eq(transaction.transaction_id))
            .exec(db)
            .await?;

        let now = Utc::now();
        let model = receipt_images::ActiveModel {
            owner: ActiveValue::Set(owner.to_string()),
            transaction_id: ActiveValue::Set(transaction.transaction_id),
            image: ActiveValue::Set(image),
            thumbnail: ActiveValue::Set(thumbnail),
            image_format_type: ActiveValue::Set(format.as_str().to_string()),
            active_status: ActiveValue::Set(active_status),
            date_added: ActiveValue::Set(now),
            date_updated: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        let mut active: transactions::ActiveModel = transaction.into();
        active.receipt_image_id = ActiveValue::Set(Some(model.receipt_image_id));
        active.date_updated = ActiveValue::Set(now);
        active.update(db).await?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn data_url_prefix_is_stripped() {
        let encoded = format!("data:image/png;base64,{}", STANDARD.encode(PNG_HEADER));
        assert_eq!(decode_image(&encoded, "image").unwrap(), PNG_HEADER);
    }

    #[test]
    fn garbage_base64_is_invalid() {
        assert!(matches!(
            decode_image("not base64!", "image"),
            Err(EngineError::InvalidValue(_))
        ));
        assert!(decode_image("", "image").is_err());
    }

    #[test]
    fn only_jpeg_and_png_are_accepted() {
        assert_eq!(image_format(PNG_HEADER).unwrap(), ImageFormatType::Png);
        assert!(image_format(b"GIF89a").is_err());
    }
}
