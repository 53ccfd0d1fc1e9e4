use crate::core::{CartEntry, CartSource, IngredientLine, RecipeId, UserIdentity};
use crate::utils::error::{ExportError, Result};
use crate::utils::validation::validate_amount;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Deserialize)]
struct SnapshotRecipe {
    id: RecipeId,
    #[serde(default)]
    ingredients: Vec<IngredientLine>,
}

/// JSON 快照格式：`{"recipes": [...], "carts": {"alice": [1, 2]}}`
#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    recipes: Vec<SnapshotRecipe>,
    #[serde(default)]
    carts: HashMap<String, Vec<RecipeId>>,
}

#[derive(Debug, Deserialize)]
struct RecipeLineRow {
    recipe_id: RecipeId,
    name: String,
    amount: u32,
    measurement_unit: String,
}

#[derive(Debug, Deserialize)]
struct CartRow {
    username: String,
    recipe_id: RecipeId,
}

#[derive(Debug, Default)]
struct StoreState {
    recipes: HashMap<RecipeId, Vec<IngredientLine>>,
    carts: HashMap<String, Vec<RecipeId>>,
}

/// In-process cart and recipe store.
///
/// Carts keep insertion order. Adding a recipe twice or removing one that
/// is not in the cart is rejected, mirroring the add/remove endpoints.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    state: RwLock<StoreState>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a JSON snapshot of recipes and carts.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(content)?;
        let store = Self::new();

        for recipe in snapshot.recipes {
            store.insert_recipe(recipe.id, recipe.ingredients)?;
        }

        let mut carts: Vec<(String, Vec<RecipeId>)> = snapshot.carts.into_iter().collect();
        carts.sort_by(|a, b| a.0.cmp(&b.0));
        for (username, recipe_ids) in carts {
            let user = UserIdentity::new(username);
            for recipe_id in recipe_ids {
                store.add_to_cart(&user, recipe_id)?;
            }
        }

        {
            let state = store.read()?;
            tracing::debug!(
                "Loaded snapshot with {} recipes and {} carts",
                state.recipes.len(),
                state.carts.len()
            );
        }
        Ok(store)
    }

    /// Appends `recipe_id,name,amount,measurement_unit` rows to recipes,
    /// keeping file order within each recipe.
    pub fn load_recipe_lines_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut count = 0;

        for row in reader.deserialize() {
            let row: RecipeLineRow = row?;
            validate_amount(&row.name, row.amount)?;
            self.write()?
                .recipes
                .entry(row.recipe_id)
                .or_default()
                .push(IngredientLine::new(row.name, row.amount, row.measurement_unit));
            count += 1;
        }

        Ok(count)
    }

    /// Adds `username,recipe_id` rows to carts.
    pub fn load_carts_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut count = 0;

        for row in reader.deserialize() {
            let row: CartRow = row?;
            self.add_to_cart(&UserIdentity::new(row.username), row.recipe_id)?;
            count += 1;
        }

        Ok(count)
    }

    /// Stores or replaces a recipe's ingredient lines. A recipe needs at
    /// least one line, so a non-empty cart always yields a non-empty report.
    pub fn insert_recipe(&self, recipe_id: RecipeId, lines: Vec<IngredientLine>) -> Result<()> {
        if lines.is_empty() {
            return Err(ExportError::ValidationError {
                message: format!("Recipe {} has no ingredients", recipe_id),
            });
        }
        for line in &lines {
            validate_amount(&line.name, line.amount)?;
        }
        self.write()?.recipes.insert(recipe_id, lines);
        Ok(())
    }

    pub fn add_to_cart(&self, user: &UserIdentity, recipe_id: RecipeId) -> Result<()> {
        let mut state = self.write()?;
        if !state.recipes.contains_key(&recipe_id) {
            return Err(ExportError::RecipeNotFound { recipe_id });
        }

        let cart = state.carts.entry(user.username.clone()).or_default();
        if cart.contains(&recipe_id) {
            return Err(ExportError::AlreadyInCart {
                username: user.username.clone(),
                recipe_id,
            });
        }

        cart.push(recipe_id);
        Ok(())
    }

    pub fn remove_from_cart(&self, user: &UserIdentity, recipe_id: RecipeId) -> Result<()> {
        let mut state = self.write()?;
        let not_in_cart = || ExportError::NotInCart {
            username: user.username.clone(),
            recipe_id,
        };

        let cart = state.carts.get_mut(&user.username).ok_or_else(not_in_cart)?;
        let position = cart
            .iter()
            .position(|id| *id == recipe_id)
            .ok_or_else(not_in_cart)?;
        cart.remove(position);
        Ok(())
    }

    pub fn is_in_cart(&self, user: &UserIdentity, recipe_id: RecipeId) -> Result<bool> {
        Ok(self
            .read()?
            .carts
            .get(&user.username)
            .is_some_and(|cart| cart.contains(&recipe_id)))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| ExportError::ProcessingError {
            message: "cart store lock poisoned".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|_| ExportError::ProcessingError {
            message: "cart store lock poisoned".to_string(),
        })
    }
}

impl CartSource for InMemoryCartStore {
    async fn cart_entries(&self, user: &UserIdentity) -> Result<Vec<CartEntry>> {
        Ok(self
            .read()?
            .carts
            .get(&user.username)
            .map(|cart| {
                cart.iter()
                    .map(|&recipe_id| CartEntry { recipe_id })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn ingredient_lines(&self, recipe_id: RecipeId) -> Result<Vec<IngredientLine>> {
        self.read()?
            .recipes
            .get(&recipe_id)
            .cloned()
            .ok_or(ExportError::RecipeNotFound { recipe_id })
    }
}
