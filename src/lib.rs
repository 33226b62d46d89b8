// Fichier principal de la bibliothèque SIMBOT
// Expose tous les modules pour utilisation externe (par le binaire et les tests)

pub mod types;       // Types de base (CellKind, Mode, commandes, constantes)
pub mod error;       // Erreurs de chargement et de configuration
pub mod map;         // Chargement et requêtes sur la grille
pub mod pathfinding; // Recherche de plus court chemin (A*)
pub mod robot;       // État du robot (position, batterie, inventaire)
pub mod world;       // État mutable de la simulation
pub mod station;     // Machines à états des stations (recharge, livraison)
pub mod planner;     // Estimation des coûts et choix de la prochaine action
pub mod executor;    // Exécution pas-à-pas des actions planifiées
pub mod simulation;  // Contrôleur de simulation (tick, modes, commandes)
pub mod snapshot;    // État sérialisable pour la couche de présentation
pub mod display;     // Affichage terminal

// Ré-exportation des types principaux pour faciliter l'importation
pub use types::*;
pub use error::SimError;
pub use map::Grid;
pub use robot::Robot;
pub use world::WorldState;
pub use simulation::Simulation;
pub use snapshot::*;
