use crate::domain::model::{CartEntry, IngredientLine};
use crate::domain::ports::CartSource;
use crate::utils::error::Result;

/// 依購物車順序取得所有食譜的食材行，不做去重
pub async fn collect_ingredients<S: CartSource>(
    source: &S,
    entries: &[CartEntry],
) -> Result<Vec<IngredientLine>> {
    let mut lines = Vec::new();

    for entry in entries {
        let recipe_lines = source.ingredient_lines(entry.recipe_id).await?;
        tracing::debug!(
            "Recipe {} contributed {} ingredient lines",
            entry.recipe_id,
            recipe_lines.len()
        );
        lines.extend(recipe_lines);
    }

    Ok(lines)
}
