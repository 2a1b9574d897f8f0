//! Owner name dictionary

use rand::seq::SliceRandom;
use rand::Rng;

const NAMES: &[&str] = &[
    "Aaron", "Abigail", "Adele", "Agnes", "Albert", "Alden", "Alma", "Amos", "Anita", "Arlo",
    "Beatrice", "Bennett", "Bernice", "Bradley", "Bridget", "Calvin", "Carmen", "Cecil", "Clara",
    "Cole", "Daisy", "Dalton", "Delia", "Desmond", "Dora", "Edgar", "Edith", "Elena", "Elmer",
    "Esther", "Felix", "Fern", "Flora", "Gideon", "Greta", "Harlan", "Hazel", "Homer", "Ida",
    "Ira", "Iris", "Jasper", "Joan", "Josie", "Kendall", "Lena", "Lionel", "Lorna", "Mabel",
    "Marvin", "Mae", "Nadia", "Nell", "Otis", "Opal", "Percy", "Pearl", "Quincy", "Rhoda",
    "Rufus", "Ruth", "Silas", "Stella", "Tobias", "Thea", "Ulysses", "Vera", "Virgil", "Wade",
    "Willa", "Xavier", "Yvonne", "Zane", "Zelda",
];

/// A capitalised name from the dictionary
pub fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    NAMES.choose(rng).copied().unwrap_or("Smith").to_string()
}
